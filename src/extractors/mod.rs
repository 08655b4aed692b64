//! Extraction over a selected node set
//!
//! Each module turns the current node set into one result shape:
//! attribute values (plain or keyed), text values, or a key/value table.

mod attribute;
mod table;
mod text;

pub use attribute::*;
pub use table::*;
pub use text::*;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::node::{Node, Property};

/// Function deriving a key from a node. `None` or an empty string means
/// "no key" and fails the whole extraction.
pub type KeyCallback<'k> = Box<dyn Fn(&Node<'_>) -> Option<String> + 'k>;

/// How extracted attribute values are keyed.
///
/// A fixed key for every value, where each entry overwrites the previous
/// one, is `KeyStrategy::callback(|_| Some(key.to_string()))`.
#[derive(Default)]
pub enum KeyStrategy<'k> {
    /// Plain ordered list
    #[default]
    None,
    /// Keyed by a property of each node; the last duplicate wins
    NodeProperty(Property),
    /// Keyed by whatever the callback returns for each node
    Callback(KeyCallback<'k>),
}

impl<'k> KeyStrategy<'k> {
    pub fn property(property: Property) -> Self {
        KeyStrategy::NodeProperty(property)
    }

    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(&Node<'_>) -> Option<String> + 'k,
    {
        KeyStrategy::Callback(Box::new(callback))
    }
}

impl fmt::Debug for KeyStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStrategy::None => f.write_str("None"),
            KeyStrategy::NodeProperty(property) => {
                f.debug_tuple("NodeProperty").field(property).finish()
            }
            KeyStrategy::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Result of attribute extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValues {
    List(Vec<String>),
    /// Insertion ordered; a repeated key keeps its first position and its last value
    Keyed(IndexMap<String, String>),
}

impl AttributeValues {
    /// Empty result of the shape `key` produces
    pub fn empty(key: &KeyStrategy<'_>) -> Self {
        match key {
            KeyStrategy::None => AttributeValues::List(Vec::new()),
            _ => AttributeValues::Keyed(IndexMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttributeValues::List(values) => values.len(),
            AttributeValues::Keyed(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValues::List(values) => Some(values.as_slice()),
            AttributeValues::Keyed(_) => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&IndexMap<String, String>> {
        match self {
            AttributeValues::Keyed(values) => Some(values),
            AttributeValues::List(_) => None,
        }
    }
}

/// Result of text extraction. The shape follows the node count: one node
/// gives `Single`, more give `Many`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TextValue {
    Single(String),
    Many(Vec<String>),
}

impl TextValue {
    pub fn as_single(&self) -> Option<&str> {
        match self {
            TextValue::Single(value) => Some(value.as_str()),
            TextValue::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            TextValue::Single(value) => vec![value],
            TextValue::Many(values) => values,
        }
    }
}
