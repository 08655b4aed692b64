//! XPath-driven extraction from fetched HTML pages
//!
//! Fetch a page, select nodes with an XPath query, then pull out:
//! - attribute values (links, image sources), optionally made absolute
//!   against the page host and keyed by a node property or a callback
//! - text values, one per selected node
//! - key/value tables zipped from a flat node set
//!
//! ```no_run
//! use xpath_extract::{Document, FetchOptions, KeyStrategy, Property};
//!
//! let doc = Document::fetch("https://example.com/", &FetchOptions::default())?;
//! let links = doc
//!     .select("//a")?
//!     .extract_urls("href", &KeyStrategy::property(Property::TextContent))?;
//! println!("{}", serde_json::to_string_pretty(&links).unwrap_or_default());
//! # Ok::<(), xpath_extract::Error>(())
//! ```

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod host;
pub mod node;
pub mod source;
pub mod transport;
pub mod xpath;

pub use config::FetchOptions;
pub use document::Document;
pub use engine::{QueryEngine, Selection};
pub use error::{Error, Result};
pub use extractors::{AttributeValues, KeyCallback, KeyStrategy, TableLayout, TextValue};
pub use host::Host;
pub use node::{Node, Property};
pub use source::DocumentSource;
pub use transport::{HttpTransport, Transport};
pub use xpath::Query;
