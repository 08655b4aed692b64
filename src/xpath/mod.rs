//! XPath queries over parsed HTML
//!
//! Supports the location-path subset of XPath 1.0 that scraping code
//! actually uses: `/`, `//`, unions, the tree and attribute axes, name
//! tests, `*`, `node()`, `text()` and predicates built from positions,
//! attributes, text, string functions, arithmetic and comparisons. Queries
//! select elements, text nodes and attributes.

mod eval;
mod lexer;
mod parser;

use std::fmt;
use std::str::FromStr;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::node::Node;
use parser::LocationPath;

/// A parsed XPath expression, reusable across documents
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    paths: Vec<LocationPath>,
}

impl Query {
    pub fn parse(query: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidQuery {
            query: query.to_string(),
            message,
        };

        let tokens = lexer::tokenize(query).map_err(invalid)?;
        let paths = parser::parse(tokens).map_err(invalid)?;

        Ok(Self {
            source: query.to_string(),
            paths,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matching nodes in document order
    pub fn select<'a>(&self, document: &'a Document) -> Vec<Node<'a>> {
        eval::evaluate(document, &self.paths)
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Query::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
