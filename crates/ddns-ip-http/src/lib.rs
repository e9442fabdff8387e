// # HTTP IP Source
//
// This crate provides an HTTP-based public address source for the DDNS
// system.
//
// ## Architecture
//
// Fetches the caller's public address with a single GET against a lookup
// service that answers with the address as a plain-text body (e.g.
// api.ipify.org). The body is trimmed of surrounding whitespace and
// otherwise passed through unvalidated.
//
// Caching across zones is owned by `ddns_core::PublicAddressResolver`,
// not by this source.

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::time::Duration;

/// Default lookup service, returns plain text IP
pub const DEFAULT_IP_SERVICE: &str = "https://api.ipify.org";

/// Default HTTP timeout for lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public address source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source for `url`
    ///
    /// # Parameters
    ///
    /// - `url`: Lookup endpoint (e.g., "https://api.ipify.org")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!(url = %self.url, "Looking up public address");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::address(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::address(format!(
                "HTTP error from {}: {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::address(format!("Failed to read response: {}", e)))?;

        let address = body.trim();
        if address.is_empty() {
            return Err(Error::address(format!("Empty response from {}", self.url)));
        }

        Ok(address.to_string())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_plain_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpIpSource::new(format!("{}/", server.uri())).unwrap();
        assert_eq!(source.current().await.unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn body_is_not_validated_as_an_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("2001:db8::1"))
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri()).unwrap();
        assert_eq!(source.current().await.unwrap(), "2001:db8::1");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri()).unwrap();
        let err = source.current().await.unwrap_err();
        assert!(matches!(err, Error::AddressResolution(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri()).unwrap();
        assert!(matches!(
            source.current().await,
            Err(Error::AddressResolution(_))
        ));
    }

    #[test]
    fn default_service_is_ipify() {
        let source = HttpIpSource::new(DEFAULT_IP_SERVICE).unwrap();
        assert_eq!(source.url(), DEFAULT_IP_SERVICE);
        assert_eq!(source.source_name(), "http");
    }
}
