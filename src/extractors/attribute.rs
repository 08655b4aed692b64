//! Attribute extraction, typically links (`href`, `src`)

use indexmap::IndexMap;
use log::{trace, warn};

use super::{AttributeValues, KeyStrategy};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::node::Node;

/// Read `attribute` from every node that has it, in node-set order.
///
/// Nodes without the attribute are skipped. With `resolve_relative` the value
/// is prefixed with `host` verbatim. Literal spaces become `%20`; nothing
/// else is escaped. A callback key strategy that yields no key for any node
/// fails the whole call with [`Error::MissingKey`].
pub fn extract_attribute(
    nodes: &[Node<'_>],
    host: &Host,
    attribute: &str,
    resolve_relative: bool,
    key: &KeyStrategy<'_>,
) -> Result<AttributeValues> {
    let values = nodes.iter().enumerate().filter_map(|(index, node)| {
        node.attribute(attribute).map(|raw| {
            let value = if resolve_relative {
                host.resolve(raw)
            } else {
                raw.to_string()
            };
            (index, node, encode_spaces(value))
        })
    });

    let result = match key {
        KeyStrategy::None => AttributeValues::List(values.map(|(_, _, value)| value).collect()),
        KeyStrategy::NodeProperty(property) => AttributeValues::Keyed(
            values
                .map(|(_, node, value)| (node.property(property), value))
                .collect(),
        ),
        KeyStrategy::Callback(callback) => {
            let mut keyed = IndexMap::new();
            for (index, node, value) in values {
                match callback(node) {
                    Some(name) if !name.is_empty() => {
                        keyed.insert(name, value);
                    }
                    _ => {
                        warn!("no key for `{attribute}` value {value:?} at node {index}");
                        return Err(Error::MissingKey { index });
                    }
                }
            }
            AttributeValues::Keyed(keyed)
        }
    };

    trace!(
        "extracted {} `{}` values from {} nodes",
        result.len(),
        attribute,
        nodes.len()
    );
    Ok(result)
}

fn encode_spaces(value: String) -> String {
    if value.contains(' ') {
        value.replace(' ', "%20")
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::node::Property;

    const LINKS: &str = r#"
    <ul>
        <li><a href="/a" title="First">One</a></li>
        <li><a>No link</a></li>
        <li><a href="/b" title="Second">Two</a></li>
        <li><a href="/my file.pdf" title="">Three</a></li>
    </ul>
    "#;

    fn links(doc: &Document) -> Vec<Node<'_>> {
        doc.select("//a").unwrap().nodes().unwrap().to_vec()
    }

    #[test]
    fn test_missing_attribute_is_skipped() {
        let doc = Document::parse(LINKS, "https://example.com/");
        let nodes = links(&doc);

        let values = extract_attribute(&nodes[..3], doc.host(), "href", false, &KeyStrategy::None)
            .unwrap();
        assert_eq!(values, AttributeValues::List(vec!["/a".into(), "/b".into()]));
    }

    #[test]
    fn test_relative_resolution_and_space_encoding() {
        let doc = Document::parse(LINKS, "https://example.com/dir/page.html");
        let nodes = links(&doc);

        let values =
            extract_attribute(&nodes, doc.host(), "href", true, &KeyStrategy::None).unwrap();
        assert_eq!(
            values.as_list().unwrap(),
            [
                "https://example.com//a",
                "https://example.com//b",
                "https://example.com//my%20file.pdf",
            ]
        );
    }

    #[test]
    fn test_empty_host_resolves_to_identity() {
        let doc = Document::parse(LINKS, "::not a url::");
        let nodes = links(&doc);

        let values =
            extract_attribute(&nodes, doc.host(), "href", true, &KeyStrategy::None).unwrap();
        assert_eq!(values.as_list().unwrap(), ["/a", "/b", "/my%20file.pdf"]);
    }

    #[test]
    fn test_keyed_by_property() {
        let doc = Document::parse(LINKS, "https://example.com/");
        let nodes = links(&doc);

        let key = KeyStrategy::property(Property::TextContent);
        let values = extract_attribute(&nodes, doc.host(), "href", false, &key).unwrap();
        let keyed = values.as_keyed().unwrap();

        assert_eq!(keyed.len(), 3);
        assert_eq!(keyed["One"], "/a");
        assert_eq!(keyed["Three"], "/my%20file.pdf");
        assert_eq!(keyed.keys().collect::<Vec<_>>(), ["One", "Two", "Three"]);
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let doc = Document::parse(LINKS, "https://example.com/");
        let nodes = links(&doc);

        let key = KeyStrategy::property(Property::NodeName);
        let values = extract_attribute(&nodes, doc.host(), "href", false, &key).unwrap();

        let keyed = values.as_keyed().unwrap();
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed["a"], "/my%20file.pdf");
    }

    #[test]
    fn test_callback_keys() {
        let doc = Document::parse(LINKS, "https://example.com/");
        let nodes = links(&doc);

        let key = KeyStrategy::callback(|node| node.attribute("title").map(str::to_uppercase));
        let values = extract_attribute(&nodes[..3], doc.host(), "href", true, &key).unwrap();

        let keyed = values.as_keyed().unwrap();
        assert_eq!(keyed["FIRST"], "https://example.com//a");
        assert_eq!(keyed["SECOND"], "https://example.com//b");
    }

    #[test]
    fn test_callback_without_key_aborts_everything() {
        let doc = Document::parse(LINKS, "https://example.com/");
        let nodes = links(&doc);

        // the fourth link has an empty title
        let key = KeyStrategy::callback(|node| node.attribute("title").map(str::to_string));
        let err = extract_attribute(&nodes, doc.host(), "href", false, &key).unwrap_err();
        assert!(matches!(err, Error::MissingKey { index: 3 }));

        let key = KeyStrategy::callback(|_| None);
        let err = extract_attribute(&nodes, doc.host(), "href", false, &key).unwrap_err();
        assert!(matches!(err, Error::MissingKey { index: 0 }));
    }

    #[test]
    fn test_callback_not_called_for_nodes_without_attribute() {
        let doc = Document::parse(LINKS, "https://example.com/");
        let nodes = links(&doc);

        let key = KeyStrategy::callback(|node| {
            assert!(node.has_attribute("href"));
            Some(node.text_content())
        });
        let values = extract_attribute(&nodes[..3], doc.host(), "href", false, &key).unwrap();
        assert_eq!(values.len(), 2);
    }
}
