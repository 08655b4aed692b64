//! Host prefix derived from a document URL
//!
//! The prefix is `scheme://hostname/` (or `hostname/` without a scheme) and is
//! glued in front of attribute values by plain string concatenation. No URL
//! joining happens here: `/a` becomes `https://example.com//a`.

use std::fmt;

use serde::Serialize;
use url::{ParseError, Url};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    /// Derive the host prefix from a URL. Anything without a usable host
    /// yields the empty prefix.
    pub fn from_url(raw: &str) -> Self {
        let raw = raw.trim();

        match Url::parse(raw) {
            Ok(url) => match url.host_str() {
                Some(host) if !host.is_empty() => Host(format!("{}://{}/", url.scheme(), host)),
                _ => Host::default(),
            },
            Err(ParseError::RelativeUrlWithoutBase) => Self::from_schemeless(raw),
            Err(_) => Host::default(),
        }
    }

    /// `example.com/page` and `//example.com/page` carry a host but no scheme
    fn from_schemeless(raw: &str) -> Self {
        let authority = match raw.strip_prefix("//") {
            Some(rest) => rest,
            None if raw.starts_with('/') => return Host::default(),
            None => raw,
        };

        Url::parse(&format!("http://{authority}"))
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .filter(|host| !host.is_empty())
            .map(|host| Host(format!("{host}/")))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefix `value` with the host. With an empty host this is the identity.
    pub fn resolve(&self, value: &str) -> String {
        let mut resolved = String::with_capacity(self.0.len() + value.len());
        resolved.push_str(&self.0);
        resolved.push_str(value);
        resolved
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Host {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
