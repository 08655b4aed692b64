//! URL to parsed [`Document`]
//!
//! One `load` is one GET through the transport, no caching and no retries.

use log::debug;

use crate::config::FetchOptions;
use crate::document::Document;
use crate::error::Result;
use crate::transport::{HttpTransport, Transport};

#[derive(Debug, Clone)]
pub struct DocumentSource<T = HttpTransport> {
    transport: T,
}

impl DocumentSource<HttpTransport> {
    /// Source backed by the `ureq` transport configured from `options`
    pub fn new(options: &FetchOptions) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(options)?,
        })
    }
}

impl<T: Transport> DocumentSource<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch `url` and parse the body. Bodies that are not valid UTF-8 are
    /// decoded lossily rather than rejected.
    pub fn load(&self, url: &str) -> Result<Document> {
        debug!("loading {url}");
        let body = self.transport.get(url)?;
        let body = String::from_utf8_lossy(&body);
        Ok(Document::parse(&body, url))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    #[test]
    fn test_load_parses_body_and_host() {
        let source = DocumentSource::with_transport(|_: &str| -> Result<Vec<u8>> {
            Ok(b"<a href='/x'>x</a>".to_vec())
        });

        let doc = source.load("https://example.com/page").unwrap();
        assert_eq!(doc.host().as_str(), "https://example.com/");
        assert_eq!(doc.url(), "https://example.com/page");
    }

    #[test]
    fn test_load_propagates_fetch_failure() {
        let source = DocumentSource::with_transport(|url: &str| -> Result<Vec<u8>> {
            Err(Error::fetch(url, "connection refused"))
        });

        match source.load("https://example.com/") {
            Err(Error::FetchFailed { url, reason }) => {
                assert_eq!(url, "https://example.com/");
                assert_eq!(reason, "connection refused");
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_one_request_per_load() {
        let calls = Cell::new(0);
        let source = DocumentSource::with_transport(|_: &str| -> Result<Vec<u8>> {
            calls.set(calls.get() + 1);
            Ok(Vec::new())
        });

        source.load("http://a.test/").unwrap();
        source.load("http://a.test/").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let source = DocumentSource::with_transport(|_: &str| -> Result<Vec<u8>> {
            Ok(b"<p>caf\xe9</p>".to_vec())
        });

        let doc = source.load("http://a.test/").unwrap();
        let text = doc.select("//p").unwrap().text();
        assert_eq!(
            text.map(|t| t.into_vec()),
            Some(vec!["caf\u{fffd}".to_string()])
        );
    }
}
