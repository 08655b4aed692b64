//! Parsed HTML document plus the host prefix of the URL it came from

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use log::debug;
use scraper::Html;

use crate::config::FetchOptions;
use crate::engine::QueryEngine;
use crate::error::Result;
use crate::host::Host;
use crate::source::DocumentSource;

pub struct Document {
    html: Html,
    url: String,
    host: Host,
    /// Pre-order index of every tree node, used to keep query results in document order
    order: HashMap<NodeId, usize>,
}

impl Document {
    /// Parse `body` as HTML and derive the host from `url`.
    ///
    /// Never fails: markup errors are recovered by the HTML5 parser and only
    /// reported in the debug log.
    pub fn parse(body: &str, url: &str) -> Self {
        let html = Html::parse_document(body);
        if !html.errors.is_empty() {
            debug!("ignored {} markup errors in {}", html.errors.len(), url);
        }

        let order = html
            .tree
            .root()
            .descendants()
            .enumerate()
            .map(|(index, node)| (node.id(), index))
            .collect();

        Self {
            html,
            url: url.to_string(),
            host: Host::from_url(url),
            order,
        }
    }

    /// Fetch and parse in one go, with the default HTTP transport
    pub fn fetch(url: &str, options: &FetchOptions) -> Result<Self> {
        DocumentSource::new(options)?.load(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// A query engine over this document with nothing selected yet
    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(self)
    }

    /// A query engine over this document with `query` already selected
    pub fn select(&self, query: &str) -> Result<QueryEngine<'_>> {
        let mut engine = QueryEngine::new(self);
        engine.select(query)?;
        Ok(engine)
    }

    pub(crate) fn root(&self) -> NodeRef<'_, scraper::Node> {
        self.html.tree.root()
    }

    pub(crate) fn position(&self, id: NodeId) -> usize {
        self.order.get(&id).copied().unwrap_or(usize::MAX)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("host", &self.host)
            .field("nodes", &self.order.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerates_broken_markup() {
        let doc = Document::parse(
            "<html><body><div><p>one<p>two</span></div><table><td>x</table>",
            "http://example.com/x",
        );

        assert_eq!(doc.host().as_str(), "http://example.com/");
        assert_eq!(doc.url(), "http://example.com/x");

        let engine = doc.select("//p").unwrap();
        assert_eq!(engine.nodes().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_document_order_is_preorder() {
        let doc = Document::parse("<div><span></span></div><p></p>", "");
        let root = doc.root();

        let positions: Vec<usize> = root.descendants().map(|n| doc.position(n.id())).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert_eq!(doc.position(root.id()), 0);
    }

    #[test]
    fn test_query_starts_unselected() {
        let doc = Document::parse("<p>x</p>", "");
        assert!(!doc.query().is_selected());
    }
}
