//! Error type shared by fetching, querying and extraction

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not produce a body (network error, non-2xx status, unreadable body)
    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// A callback key strategy returned no key for the node at `index` in the node set
    #[error("unable to determine a key for node {index}")]
    MissingKey { index: usize },

    #[error(
        "invalid row geometry: row width {row_width}, key offset {key_offset}, value offset {value_offset}"
    )]
    InvalidRowGeometry {
        row_width: usize,
        key_offset: usize,
        value_offset: usize,
    },

    #[error("invalid query `{query}`: {message}")]
    InvalidQuery { query: String, message: String },

    #[error("unknown node property `{0}`")]
    UnknownProperty(String),

    #[error("invalid fetch options: {0}")]
    InvalidOptions(String),
}

impl Error {
    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        Error::FetchFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
