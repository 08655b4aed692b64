//! Node handles and node properties
//!
//! A [`Node`] is an element, text node or attribute of a parsed
//! [`Document`](crate::Document). The extraction layer only ever reads
//! attributes and named properties from it.

use std::fmt;
use std::str::FromStr;

use ego_tree::NodeRef;
use scraper::ElementRef;

use crate::error::Error;

/// Text of all significant descendant text nodes, in document order.
///
/// Whitespace-only text that only formats the markup (see [`is_ignorable`])
/// is dropped; whitespace separating inline content is kept.
pub(crate) fn text_content(node: &NodeRef<'_, scraper::Node>) -> String {
    node.descendants()
        .filter(|n| !is_ignorable(n))
        .filter_map(|n| n.value().as_text())
        .map(|text| &**text)
        .collect()
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// A whitespace-only text node is ignorable when it sits directly in
/// `html`/`head`, opens or closes its parent's content, or borders a
/// block-level element. Between two inline or text siblings it is a word
/// separator and stays.
pub(crate) fn is_ignorable(node: &NodeRef<'_, scraper::Node>) -> bool {
    match node.value().as_text() {
        Some(text) if is_blank(text) => {}
        _ => return false,
    }

    let in_document_frame = node
        .parent()
        .and_then(|parent| parent.value().as_element().map(|e| e.name()))
        .is_some_and(|name| matches!(name, "html" | "head"));
    if in_document_frame {
        return true;
    }

    match (
        node.prev_siblings().find(is_content),
        node.next_siblings().find(is_content),
    ) {
        (Some(prev), Some(next)) => is_block(&prev) || is_block(&next),
        _ => true,
    }
}

fn is_content(node: &NodeRef<'_, scraper::Node>) -> bool {
    node.value().is_element() || node.value().is_text()
}

fn is_block(node: &NodeRef<'_, scraper::Node>) -> bool {
    node.value().as_element().is_some_and(|element| {
        matches!(
            element.name(),
            "address" | "article" | "aside" | "blockquote" | "body" | "caption" | "col"
                | "colgroup" | "dd" | "details" | "dialog" | "div" | "dl" | "dt" | "fieldset"
                | "figcaption" | "figure" | "footer" | "form" | "h1" | "h2" | "h3" | "h4"
                | "h5" | "h6" | "head" | "header" | "hgroup" | "hr" | "html" | "li" | "link"
                | "main" | "meta" | "nav" | "ol" | "optgroup" | "option" | "p" | "pre"
                | "script" | "section" | "select" | "style" | "summary" | "table" | "tbody"
                | "td" | "tfoot" | "th" | "thead" | "title" | "tr" | "ul"
        )
    })
}

/// Node selected by a query: an element, a text node or an attribute
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    kind: Kind<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Kind<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Attribute { name: &'a str, value: &'a str },
}

impl<'a> Node<'a> {
    pub(crate) fn from_element(element: ElementRef<'a>) -> Self {
        Self {
            kind: Kind::Element(element),
        }
    }

    pub(crate) fn from_text(text: &'a str) -> Self {
        Self {
            kind: Kind::Text(text),
        }
    }

    pub(crate) fn from_attribute(name: &'a str, value: &'a str) -> Self {
        Self {
            kind: Kind::Attribute { name, value },
        }
    }

    /// Only elements carry attributes
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attribute lookup. HTML attribute names are stored lower-cased, so a
    /// miss on the exact name retries with the lower-cased one.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        let element = self.as_element()?.value();
        element
            .attr(name)
            .or_else(|| element.attr(&name.to_ascii_lowercase()))
    }

    /// Tag name for elements (lower-case for HTML), the attribute name for
    /// attributes and `#text` for text nodes
    pub fn name(&self) -> &'a str {
        match self.kind {
            Kind::Element(element) => element.value().name(),
            Kind::Text(_) => "#text",
            Kind::Attribute { name, .. } => name,
        }
    }

    /// For text and attribute nodes this is their value
    pub fn text_content(&self) -> String {
        match self.kind {
            Kind::Element(element) => text_content(&element),
            Kind::Text(value) | Kind::Attribute { value, .. } => value.to_string(),
        }
    }

    pub fn property(&self, property: &Property) -> String {
        match (property, self.kind) {
            (Property::TextContent, _) => self.text_content(),
            (Property::NodeName, _) => self.name().to_string(),
            (Property::InnerHtml, Kind::Element(element)) => element.inner_html(),
            (Property::OuterHtml, Kind::Element(element)) => element.html(),
            (Property::InnerHtml | Property::OuterHtml, _) => self.text_content(),
            (Property::Attribute(name), _) => self.attribute(name).unwrap_or_default().to_string(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, Kind::Element(_))
    }

    /// Underlying `scraper` element, for anything this API does not cover
    pub fn as_element(&self) -> Option<ElementRef<'a>> {
        match self.kind {
            Kind::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Named value read off a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Property {
    #[default]
    TextContent,
    NodeName,
    InnerHtml,
    OuterHtml,
    /// Attribute value, empty when the attribute is absent
    Attribute(String),
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(attribute) = s.strip_prefix('@') {
            if attribute.is_empty() {
                return Err(Error::UnknownProperty(s.to_string()));
            }
            return Ok(Property::Attribute(attribute.to_string()));
        }

        match s {
            "textContent" | "text content" | "text" | "nodeValue" => Ok(Property::TextContent),
            "nodeName" | "tagName" | "localName" => Ok(Property::NodeName),
            "innerHTML" | "html" => Ok(Property::InnerHtml),
            "outerHTML" => Ok(Property::OuterHtml),
            other => Err(Error::UnknownProperty(other.to_string())),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::TextContent => f.write_str("textContent"),
            Property::NodeName => f.write_str("nodeName"),
            Property::InnerHtml => f.write_str("innerHTML"),
            Property::OuterHtml => f.write_str("outerHTML"),
            Property::Attribute(name) => write!(f, "@{name}"),
        }
    }
}
