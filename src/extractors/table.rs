//! Key/value tables from a flat node set
//!
//! `//tr/td` over a two column table yields `[k1, v1, k2, v2, ...]`; reading
//! it in rows of two with the key at offset 0 and the value at offset 1
//! zips it back into `{k1: v1, k2: v2}`.

use indexmap::IndexMap;
use log::trace;

use crate::error::{Error, Result};
use crate::node::{Node, Property};

/// Row geometry and the properties read for keys and values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub row_width: usize,
    pub key_offset: usize,
    pub value_offset: usize,
    pub key_property: Property,
    pub value_property: Property,
}

impl TableLayout {
    /// Keys and values read as text content
    pub fn new(row_width: usize, key_offset: usize, value_offset: usize) -> Self {
        Self {
            row_width,
            key_offset,
            value_offset,
            key_property: Property::TextContent,
            value_property: Property::TextContent,
        }
    }

    pub fn key_property(mut self, property: Property) -> Self {
        self.key_property = property;
        self
    }

    pub fn value_property(mut self, property: Property) -> Self {
        self.value_property = property;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_width == 0
            || self.key_offset >= self.row_width
            || self.value_offset >= self.row_width
        {
            return Err(Error::InvalidRowGeometry {
                row_width: self.row_width,
                key_offset: self.key_offset,
                value_offset: self.value_offset,
            });
        }
        Ok(())
    }
}

/// Zip `nodes` into a key/value map, one entry per full row.
///
/// A trailing partial row is ignored. Duplicate keys keep the last value.
pub fn extract_table(nodes: &[Node<'_>], layout: &TableLayout) -> Result<IndexMap<String, String>> {
    layout.validate()?;

    let table: IndexMap<String, String> = nodes
        .chunks_exact(layout.row_width)
        .map(|row| {
            (
                row[layout.key_offset].property(&layout.key_property),
                row[layout.value_offset].property(&layout.value_property),
            )
        })
        .collect();

    trace!(
        "zipped {} nodes into {} rows of {}",
        nodes.len(),
        table.len(),
        layout.row_width
    );
    Ok(table)
}
