// # State Store Trait
//
// Defines the interface for persisting the last known IP.
//
// ## Purpose
//
// The persisted IP lets a restarted daemon skip a provider update when
// nothing changed while it was down.
//
// ## Implementations
//
// - File-based: JSON file written atomically (`FileStateStore`)
// - In-memory: non-durable (`MemoryStateStore`)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persisted state record
///
/// Records are values: the engine never edits the one it holds. It builds a
/// candidate with [`State::with_ip`], writes it, and adopts it only after
/// the write succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct State {
    /// The last IP written to durable storage. Empty on a fresh install.
    #[serde(default)]
    pub ip: String,

    /// When this record was built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl State {
    /// Create a state record holding `ip`
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            updated_at: None,
        }
    }

    /// Build a candidate record carrying `ip`, leaving `self` untouched
    ///
    /// Every other field is copied from `self`; the timestamp is refreshed.
    pub fn with_ip(&self, ip: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.ip = ip.into();
        next.updated_at = Some(Utc::now());
        next
    }
}

/// Trait for state store implementations
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Implementation Guidelines
///
/// - **Whole-record writes**: `write` replaces the stored record entirely;
///   a failed write must leave the previous record readable
/// - **No fallbacks**: `load` fails if nothing usable is stored
/// - **Async I/O only**
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored record
    ///
    /// # Returns
    ///
    /// - `Ok(State)`: The stored record
    /// - `Err(Error)`: Storage missing, unreadable or corrupt
    async fn load(&self) -> Result<State, crate::Error>;

    /// Replace the stored record with `state`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The record is durable
    /// - `Err(Error)`: Nothing was changed
    async fn write(&self, state: &State) -> Result<(), crate::Error>;
}
