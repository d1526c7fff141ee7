// # gdddcd-core
//
// Core library for the gdddcd dynamic DNS update client.
//
// ## Architecture Overview
//
// This library provides the reconciliation loop and its seams:
// - **Config**: Read-only settings loaded and validated from JSON
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for notifying the DNS provider of a new IP
// - **StateStore**: Trait for persisting the last known IP
// - **DdnsEngine**: Timer-driven loop that keeps provider and disk in step
//
// ## Design Principles
//
// 1. **Sequential**: One tick at a time; discovery, then update, then write
// 2. **Commit on success**: Each tracker changes only after its side effect succeeded
// 3. **Retry by ticking**: Every failure is retried on the next tick, no backoff
// 4. **Library-First**: The binary is a thin wiring layer over this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, StateStore, State, UpdateResult};
pub use engine::{DdnsEngine, StateWrite, TickOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use state::{MemoryStateStore, FileStateStore};
