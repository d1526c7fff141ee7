// # Google Domains DNS Provider
//
// Publishes the current IP through the dyndns2-style update endpoint of
// Google Domains.
//
// ## Request
//
// `POST https://domains.google.com/nic/update?hostname=<hostname>&myip=<ip>`
// with HTTP Basic credentials and the configured User-Agent. One request per
// call; retries belong to the engine, which simply tries again next tick.
//
// ## Response
//
// 1. Body exactly `good <ip>`: updated, whatever the status
// 2. Status 200 with any other body: acknowledged, logged as a warning
// 3. Anything else: `Error::ProviderRejected` with status and body
//
// ## Security
//
// The password is sent only in the Authorization header. It never appears
// in URLs, logs or Debug output.

use async_trait::async_trait;
use gdddcd_core::traits::{DnsProvider, UpdateResult};
use gdddcd_core::{Config, Error, Result};
use std::time::Duration;

/// Google Domains dyndns2 update endpoint
pub const GOOGLE_DOMAINS_UPDATE_URL: &str = "https://domains.google.com/nic/update";

/// Google Domains DNS provider
pub struct GoogleDomainsProvider {
    endpoint: String,
    hostname: String,
    username: String,
    /// ⚠️ NEVER log this value
    password: String,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for GoogleDomainsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDomainsProvider")
            .field("endpoint", &self.endpoint)
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl GoogleDomainsProvider {
    /// Create a provider talking to the real Google Domains endpoint
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoint(config, GOOGLE_DOMAINS_UPDATE_URL)
    }

    /// Create a provider talking to any dyndns2-compatible endpoint
    pub fn with_endpoint(config: &Config, endpoint: impl Into<String>) -> Result<Self> {
        let client = build_client(config.user_agent(), config.http_timeout())?;

        Ok(Self {
            endpoint: endpoint.into(),
            hostname: config.hostname().to_string(),
            username: config.username().to_string(),
            password: config.password().to_string(),
            client,
        })
    }

    /// Update endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// Human-readable meaning of a dyndns2 return code, if the body starts with one
fn describe_response(body: &str) -> Option<&'static str> {
    let code = body.split_whitespace().next()?;
    let description = match code {
        "nochg" => "IP address already set for this host",
        "badauth" => "username or password is incorrect",
        "nohost" => "hostname does not exist or has no Dynamic DNS enabled",
        "notfqdn" => "hostname is not a fully qualified domain name",
        "badagent" => "user agent was rejected",
        "abuse" => "updates for this host are blocked for abuse",
        "!donator" => "feature not available to this account",
        "911" => "provider-side error, retry later",
        "dnserr" => "provider DNS error, retry later",
        "numhost" => "too many hosts in one request",
        _ => return None,
    };
    Some(description)
}

#[async_trait]
impl DnsProvider for GoogleDomainsProvider {
    async fn update_record(&self, new_ip: &str) -> Result<UpdateResult> {
        tracing::info!("Updating {} -> {}", self.hostname, new_ip);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("hostname", self.hostname.as_str()), ("myip", new_ip)])
            .send()
            .await
            .map_err(|e| Error::dns_provider(format!("transport failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::dns_provider(format!("transport failed: could not read response: {}", e))
        })?;

        if body == format!("good {}", new_ip) {
            tracing::info!("DNS record updated successfully: {} -> {}", self.hostname, new_ip);
            return Ok(UpdateResult::Updated {
                new_ip: new_ip.to_string(),
            });
        }

        if status == reqwest::StatusCode::OK {
            match describe_response(&body) {
                Some(meaning) => tracing::warn!(
                    "IP update got unexpected response body for successful update: {:?} ({})",
                    body,
                    meaning
                ),
                None => tracing::warn!(
                    "IP update got unexpected response body for successful update: {:?}",
                    body
                ),
            }
            return Ok(UpdateResult::Acknowledged {
                new_ip: new_ip.to_string(),
                response: body,
            });
        }

        Err(Error::ProviderRejected {
            status: status.as_u16(),
            body,
        })
    }

    fn provider_name(&self) -> &'static str {
        "google-domains"
    }
}
