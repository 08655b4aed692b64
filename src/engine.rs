//! Stateful query engine over one [`Document`]
//!
//! `select` replaces the current node set; every extraction reads whatever
//! was selected last. Before the first `select` the engine is
//! [`Selection::Unselected`] and extractions return empty results.

use indexmap::IndexMap;
use log::debug;

use crate::document::Document;
use crate::error::Result;
use crate::extractors::{self, AttributeValues, KeyStrategy, TableLayout, TextValue};
use crate::host::Host;
use crate::node::{Node, Property};
use crate::xpath::Query;

/// Current node set of a [`QueryEngine`]
#[derive(Debug, Clone, Default)]
pub enum Selection<'d> {
    #[default]
    Unselected,
    /// Result of the last query, in document order. May be empty.
    Selected(Vec<Node<'d>>),
}

#[derive(Debug, Clone)]
pub struct QueryEngine<'d> {
    document: &'d Document,
    selection: Selection<'d>,
}

impl<'d> QueryEngine<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self {
            document,
            selection: Selection::Unselected,
        }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn host(&self) -> &'d Host {
        self.document.host()
    }

    /// Run `query` and make its result the current node set.
    ///
    /// A query that does not parse fails with [`Error::InvalidQuery`] and
    /// leaves the current selection as it was.
    ///
    /// [`Error::InvalidQuery`]: crate::Error::InvalidQuery
    pub fn select(&mut self, query: &str) -> Result<&mut Self> {
        let query = Query::parse(query)?;
        Ok(self.select_query(&query))
    }

    /// Same as [`select`](Self::select) with a query compiled up front
    pub fn select_query(&mut self, query: &Query) -> &mut Self {
        let nodes = query.select(self.document);

        debug!("selected {} nodes with `{}`", nodes.len(), query);
        self.selection = Selection::Selected(nodes);
        self
    }

    pub fn selection(&self) -> &Selection<'d> {
        &self.selection
    }

    /// Current node set, `None` before the first `select`
    pub fn nodes(&self) -> Option<&[Node<'d>]> {
        match &self.selection {
            Selection::Unselected => None,
            Selection::Selected(nodes) => Some(nodes.as_slice()),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.selection, Selection::Selected(_))
    }

    /// See [`extractors::extract_attribute`]
    pub fn extract_attribute(
        &self,
        attribute: &str,
        resolve_relative: bool,
        key: &KeyStrategy<'_>,
    ) -> Result<AttributeValues> {
        match self.nodes() {
            Some(nodes) => extractors::extract_attribute(
                nodes,
                self.host(),
                attribute,
                resolve_relative,
                key,
            ),
            None => Ok(AttributeValues::empty(key)),
        }
    }

    /// Attribute values always prefixed with the document host
    pub fn extract_urls(&self, attribute: &str, key: &KeyStrategy<'_>) -> Result<AttributeValues> {
        self.extract_attribute(attribute, true, key)
    }

    pub fn extract_text(&self, property: &Property) -> Option<TextValue> {
        self.nodes()
            .and_then(|nodes| extractors::extract_text(nodes, property))
    }

    /// Text content of the current node set
    pub fn text(&self) -> Option<TextValue> {
        self.extract_text(&Property::TextContent)
    }

    /// Zip the current node set into a key/value map. The layout is checked
    /// even when nothing is selected.
    pub fn extract_table(&self, layout: &TableLayout) -> Result<IndexMap<String, String>> {
        match self.nodes() {
            Some(nodes) => extractors::extract_table(nodes, layout),
            None => {
                layout.validate()?;
                Ok(IndexMap::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const PAGE: &str = r#"
    <html><body>
        <nav>
            <a href="/">Home</a>
            <a href="/shop">Shop</a>
            <a name="top">Top</a>
        </nav>
        <div class="price">$19.99</div>
        <table id="specs">
            <tr><td>Weight</td><td>2kg</td></tr>
            <tr><td>Colour</td><td>Red</td></tr>
        </table>
    </body></html>
    "#;

    #[test]
    fn test_unselected_extractions_are_empty() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");
        let engine = doc.query();

        assert!(!engine.is_selected());
        assert!(engine.nodes().is_none());
        assert!(matches!(engine.selection(), Selection::Unselected));

        assert_eq!(
            engine.extract_attribute("href", true, &KeyStrategy::None).unwrap(),
            AttributeValues::List(vec![])
        );
        assert_eq!(
            engine
                .extract_attribute("href", false, &KeyStrategy::property(Property::TextContent))
                .unwrap(),
            AttributeValues::Keyed(IndexMap::new())
        );
        assert_eq!(engine.text(), None);
        assert!(engine.extract_table(&TableLayout::new(2, 0, 1)).unwrap().is_empty());
        assert!(matches!(
            engine.extract_table(&TableLayout::new(2, 0, 2)),
            Err(Error::InvalidRowGeometry { .. })
        ));
    }

    #[test]
    fn test_select_replaces_node_set() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");
        let mut engine = doc.query();

        engine.select("//nav/a").unwrap();
        assert_eq!(engine.nodes().map(<[_]>::len), Some(3));

        engine.select("//div[@class='price']").unwrap();
        assert_eq!(engine.nodes().map(<[_]>::len), Some(1));
        assert_eq!(engine.text(), Some(TextValue::Single("$19.99".into())));
    }

    #[test]
    fn test_empty_selection_stays_selected() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");
        let mut engine = doc.query();

        engine.select("//nav/a").unwrap().select("//article").unwrap();
        assert!(engine.is_selected());
        assert_eq!(engine.nodes().map(<[_]>::len), Some(0));
        assert_eq!(engine.text(), None);
        assert!(engine
            .extract_attribute("href", true, &KeyStrategy::None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_query_keeps_selection() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");
        let mut engine = doc.query();
        engine.select("//nav/a").unwrap();

        let err = engine.select("//a[").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
        assert_eq!(engine.nodes().map(<[_]>::len), Some(3));
    }

    #[test]
    fn test_fluent_extraction() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");

        let urls = doc
            .query()
            .select("//nav/a")
            .unwrap()
            .extract_urls("href", &KeyStrategy::property(Property::TextContent))
            .unwrap();
        let urls = urls.as_keyed().unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls["Home"], "https://shop.example//");
        assert_eq!(urls["Shop"], "https://shop.example//shop");

        let table = doc
            .select("//table[@id='specs']//td")
            .unwrap()
            .extract_table(&TableLayout::new(2, 0, 1))
            .unwrap();
        assert_eq!(table.get("Weight").map(String::as_str), Some("2kg"));
        assert_eq!(table.get("Colour").map(String::as_str), Some("Red"));
    }

    #[test]
    fn test_precompiled_query_and_host() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");
        let query = Query::parse("//td[1]").unwrap();

        let mut engine = doc.query();
        engine.select_query(&query);
        assert_eq!(
            engine.text(),
            Some(TextValue::Many(vec!["Weight".into(), "Colour".into()]))
        );
        assert_eq!(engine.host().as_str(), "https://shop.example/");
        assert_eq!(engine.document().url(), "https://shop.example/p/1");
    }

    #[test]
    fn test_text_and_attribute_selections() {
        let doc = Document::parse(
            r#"<html><head><title>Trail Shoe</title>
            <meta name="description" content="Light shoe"></head>
            <body><p><b>Price:</b> <span>10</span> <i>USD</i></p></body></html>"#,
            "https://shop.example/p/1",
        );
        let mut engine = doc.query();

        assert_eq!(
            engine.select("//title/text()").unwrap().text(),
            Some(TextValue::Single("Trail Shoe".into()))
        );
        assert_eq!(
            engine.select("//meta/@content").unwrap().text(),
            Some(TextValue::Single("Light shoe".into()))
        );
        assert_eq!(
            engine.select("//p").unwrap().text(),
            Some(TextValue::Single("Price: 10 USD".into()))
        );

        // attribute and text nodes have no attributes of their own
        engine.select("//meta/@content | //title/text()").unwrap();
        assert_eq!(engine.nodes().map(<[_]>::len), Some(2));
        assert!(engine
            .extract_attribute("content", false, &KeyStrategy::None)
            .unwrap()
            .is_empty());
        assert_eq!(
            engine.extract_text(&Property::NodeName),
            Some(TextValue::Many(vec!["#text".into(), "content".into()]))
        );
    }

    #[test]
    fn test_extraction_does_not_touch_selection() {
        let doc = Document::parse(PAGE, "https://shop.example/p/1");
        let engine = doc.select("//nav/a").unwrap();

        let first = engine.extract_attribute("href", false, &KeyStrategy::None).unwrap();
        let again = engine.extract_attribute("href", false, &KeyStrategy::None).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.as_list().unwrap(), ["/", "/shop"]);
        assert_eq!(engine.nodes().map(<[_]>::len), Some(3));
    }
}
