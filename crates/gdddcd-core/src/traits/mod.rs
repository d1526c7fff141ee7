//! Core traits for gdddcd
//!
//! This module defines the abstract interfaces the reconciliation loop is
//! written against.
//!
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Tell the DNS provider about a new IP
//! - [`StateStore`]: Persist the last known IP

pub mod ip_source;
pub mod dns_provider;
pub mod state_store;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, UpdateResult};
pub use state_store::{State, StateStore};
