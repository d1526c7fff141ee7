//! Error types for gdddcd
//!
//! This module defines all error types used throughout the workspace.
//!
//! The variants fall into four families:
//! - configuration errors (fatal before the loop starts)
//! - state store errors (fatal at startup, logged per tick afterwards)
//! - IP discovery errors (abandon the current tick)
//! - DNS provider errors (abandon the rest of the current tick)

use thiserror::Error;

/// Result type alias for gdddcd operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gdddcd
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be read, parsed or converted
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required configuration field is absent or empty
    #[error("Configuration error: missing required field: {0}")]
    MissingField(&'static str),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// IP discovery failed before a response status was available
    #[error("IP discovery error: {0}")]
    Discovery(String),

    /// IP discovery endpoint answered with something other than 200
    #[error("IP discovery error: http status {0}")]
    DiscoveryStatus(u16),

    /// IP discovery endpoint answered 200 with a body that is not a dotted quad
    #[error("IP discovery error: not IP-shaped: {0:?}")]
    NotIpShaped(String),

    /// DNS provider could not be reached or its response could not be read
    #[error("DNS provider error: {0}")]
    DnsProvider(String),

    /// DNS provider answered with a non-200 status
    #[error("DNS provider error: provider error: {body:?} ({status})")]
    ProviderRejected {
        /// HTTP status code
        status: u16,
        /// Plaintext response body
        body: String,
    },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create an IP discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a DNS provider error
    pub fn dns_provider(msg: impl Into<String>) -> Self {
        Self::DnsProvider(msg.into())
    }

    /// True for errors produced while loading configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingField(_))
    }

    /// True for errors produced by IP discovery
    pub fn is_discovery(&self) -> bool {
        matches!(
            self,
            Self::Discovery(_) | Self::DiscoveryStatus(_) | Self::NotIpShaped(_)
        )
    }

    /// True for errors produced by the DNS provider
    pub fn is_dns_provider(&self) -> bool {
        matches!(self, Self::DnsProvider(_) | Self::ProviderRejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = Error::MissingField("password");
        assert!(err.to_string().ends_with("missing required field: password"));
        assert!(err.is_config());
    }

    #[test]
    fn test_provider_rejection_message() {
        let err = Error::ProviderRejected {
            status: 401,
            body: "badauth".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "DNS provider error: provider error: \"badauth\" (401)"
        );
        assert!(err.is_dns_provider());
        assert!(!err.is_discovery());
    }

    #[test]
    fn test_discovery_family() {
        assert!(Error::DiscoveryStatus(503).is_discovery());
        assert!(Error::NotIpShaped("<html>".into()).is_discovery());
        assert!(Error::discovery("transport failed: timeout").is_discovery());
        assert_eq!(
            Error::DiscoveryStatus(503).to_string(),
            "IP discovery error: http status 503"
        );
    }
}
