// # DNS Provider Trait
//
// Defines the interface for telling a DNS provider about a new IP.
//
// ## Implementations
//
// - Google Domains dyndns2 endpoint: `gdddcd-provider-google` crate
//
// ## Usage
//
// ```rust,ignore
// use gdddcd_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     provider.update_record("1.2.3.4").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Result of a successful DNS update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Provider confirmed the new address with the expected acknowledgement
    Updated {
        /// The address the record now points at
        new_ip: String,
    },
    /// Provider accepted the request (HTTP 200) but the acknowledgement
    /// text was not the expected one
    Acknowledged {
        /// The address that was sent
        new_ip: String,
        /// Raw response body, for logging
        response: String,
    },
}

impl UpdateResult {
    /// The address the provider was told about
    pub fn new_ip(&self) -> &str {
        match self {
            UpdateResult::Updated { new_ip } | UpdateResult::Acknowledged { new_ip, .. } => {
                new_ip
            }
        }
    }
}

/// Trait for DNS provider implementations
///
/// A provider manages exactly one hostname with one credential pair, both
/// fixed at construction time.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - Perform HTTP/HTTPS calls to its own endpoint
/// - Parse provider-specific responses
///
/// ## Forbidden Capabilities
/// - Retrying or backing off (the engine retries on the next tick)
/// - Accessing the state store
/// - Deciding whether an update is needed
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Point the managed hostname at `new_ip`
    ///
    /// Exactly one request per call.
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateResult)`: The provider accepted the update
    /// - `Err(Error)`: Transport failure or provider rejection
    async fn update_record(&self, new_ip: &str) -> Result<UpdateResult, crate::Error>;

    /// Get the provider name (e.g., "google-domains")
    fn provider_name(&self) -> &'static str;
}
