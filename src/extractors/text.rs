//! Text extraction

use super::TextValue;
use crate::node::{Node, Property};

/// Read `property` from every node.
///
/// One node gives a bare value, several give a list in node-set order and
/// an empty node set gives `None`.
pub fn extract_text(nodes: &[Node<'_>], property: &Property) -> Option<TextValue> {
    match nodes {
        [] => None,
        [node] => Some(TextValue::Single(node.property(property))),
        _ => Some(TextValue::Many(
            nodes.iter().map(|node| node.property(property)).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    const PAGE: &str = r#"
    <div class="price">$19.99</div>
    <div class="price">$19.99</div>
    <h1 id="title">
        Product <em>A</em>
    </h1>
    "#;

    #[test]
    fn test_cardinality_decides_shape() {
        let doc = Document::parse(PAGE, "");

        let one = doc.select("//div[1]").unwrap();
        assert_eq!(
            extract_text(one.nodes().unwrap(), &Property::TextContent),
            Some(TextValue::Single("$19.99".into()))
        );

        let two = doc.select("//div").unwrap();
        assert_eq!(
            extract_text(two.nodes().unwrap(), &Property::TextContent),
            Some(TextValue::Many(vec!["$19.99".into(), "$19.99".into()]))
        );
    }

    #[test]
    fn test_empty_node_set_gives_none() {
        assert_eq!(extract_text(&[], &Property::TextContent), None);
    }

    #[test]
    fn test_other_properties() {
        let doc = Document::parse(PAGE, "");
        let title = doc.select("//h1").unwrap();
        let nodes = title.nodes().unwrap();

        assert_eq!(
            extract_text(nodes, &Property::NodeName),
            Some(TextValue::Single("h1".into()))
        );
        assert_eq!(
            extract_text(nodes, &Property::Attribute("id".into())),
            Some(TextValue::Single("title".into()))
        );
        // whitespace around the inline element is kept, blank nodes are not
        assert_eq!(
            extract_text(nodes, &Property::TextContent)
                .and_then(|t| t.as_single().map(str::to_string)),
            Some("\n        Product A".to_string())
        );
    }
}
