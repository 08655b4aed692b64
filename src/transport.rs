//! HTTP transport used by [`DocumentSource`](crate::DocumentSource)
//!
//! A transport performs a single blocking GET and hands back the raw body.
//! Redirect, retry and TLS policy all live here, never in the query layer.

use log::debug;

use crate::config::FetchOptions;
use crate::error::{Error, Result};

/// Blocking `GET url -> body`
pub trait Transport {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Closures work as transports, which keeps tests and custom clients simple
impl<F> Transport for F
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self(url)
    }
}

/// `ureq` backed transport configured from [`FetchOptions`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    headers: Vec<(String, String)>,
    max_body_bytes: u64,
}

impl HttpTransport {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let mut config = ureq::Agent::config_builder();

        if let Some(timeout) = options.timeout() {
            config = config.timeout_global(Some(timeout));
        }
        if let Some(user_agent) = options.user_agent.as_deref() {
            config = config.user_agent(user_agent);
        }
        if let Some(proxy) = options.proxy.as_deref() {
            let proxy = ureq::Proxy::new(proxy)
                .map_err(|e| Error::InvalidOptions(format!("bad proxy {proxy}: {e}")))?;
            config = config.proxy(Some(proxy));
        }

        Ok(Self {
            agent: ureq::Agent::new_with_config(config.build()),
            headers: options
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            max_body_bytes: options.max_body_bytes,
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = self.agent.get(url);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.call().map_err(|e| Error::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {status}")));
        }

        let mut body = response.into_body();
        let bytes = body
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()
            .map_err(|e| Error::fetch(url, format!("failed to read body: {e}")))?;

        debug!("fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_transport() {
        let transport = |url: &str| -> Result<Vec<u8>> { Ok(format!("<p>{url}</p>").into_bytes()) };
        assert_eq!(transport.get("x").unwrap(), b"<p>x</p>".to_vec());
    }

    #[test]
    fn test_bad_proxy_is_an_options_error() {
        let options = FetchOptions::new().with_proxy("not a proxy ::");
        let err = HttpTransport::new(&options).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }
}
