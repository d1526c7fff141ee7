// # HTTP IP Source
//
// Discovers the public IPv4 address by asking a "what is my IP" service.
//
// ## Contract
//
// - One GET per call, carrying the configured User-Agent
// - Only HTTP 200 counts; any other status is a discovery failure
// - The body is trimmed and must look like a dotted quad (`^(\d{1,3}\.){3}\d{1,3}$`)
// - Octet ranges are NOT checked: `999.999.999.999` passes through unchanged
//
// No caching: every tick gets a fresh answer from the service.

use gdddcd_core::traits::IpSource;
use gdddcd_core::{Config, Error, Result};

use regex::Regex;
use std::time::Duration;

/// Dotted-quad shape check. ASCII digits only.
const IP_SHAPE: &str = r"^([0-9]{1,3}\.){3}[0-9]{1,3}$";

/// HTTP-based IP source
pub struct HttpIpSource {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client, carries the User-Agent and timeout
    client: reqwest::Client,

    /// Precompiled dotted-quad pattern
    ip_shape: Regex,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: service that answers with the caller's IP as plain text
    /// - `user_agent`: sent verbatim on every request
    /// - `timeout`: whole-request timeout
    pub fn new(
        url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.into())
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let ip_shape = Regex::new(IP_SHAPE)
            .map_err(|e| Error::config(format!("Invalid IP pattern: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            ip_shape,
        })
    }

    /// Create a source from the `ip_check_url`, `user_agent` and `http_timeout_s` settings
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.ip_check_url(),
            config.user_agent(),
            config.http_timeout(),
        )
    }

    /// URL the IP is fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Trim the body and check its shape
    fn parse_body(&self, body: &str) -> Result<String> {
        let body = body.trim();
        if self.ip_shape.is_match(body) {
            Ok(body.to_string())
        } else {
            Err(Error::NotIpShaped(body.to_string()))
        }
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::discovery(format!("transport failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::DiscoveryStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::discovery(format!("transport failed: could not read IP: {}", e)))?;

        let ip = self.parse_body(&body)?;
        tracing::debug!("Discovered IP {} from {}", ip, self.url);
        Ok(ip)
    }
}
