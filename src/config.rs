//! Transport options
//!
//! An open bag of settings handed to the HTTP transport. Nothing outside
//! `transport` looks inside it.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Response bodies larger than this are rejected unless configured otherwise
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Overall request timeout
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Extra request headers, sent in key order
    pub headers: BTreeMap<String, String>,
    /// Proxy URL, e.g. `http://127.0.0.1:3128` or `socks5://host:1080`
    pub proxy: Option<String>,
    pub max_body_bytes: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: None,
            headers: BTreeMap::new(),
            proxy: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidOptions(e.to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let options = FetchOptions::from_json(r#"{"timeout_secs": 5, "headers": {"Accept": "text/html"}}"#)
            .unwrap();

        assert_eq!(options.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(options.headers.get("Accept").map(String::as_str), Some("text/html"));
        assert_eq!(options.user_agent, None);
        assert_eq!(options.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = FetchOptions::from_json(r#"{"timeout_secs": "soon"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn test_builders() {
        let options = FetchOptions::new()
            .with_timeout(Duration::from_secs(30))
            .with_user_agent("xpath_extract/0.1")
            .with_header("X-Token", "abc")
            .with_max_body_bytes(1024);

        assert_eq!(options.timeout_secs, Some(30));
        assert_eq!(options.user_agent.as_deref(), Some("xpath_extract/0.1"));
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.max_body_bytes, 1024);
    }
}
