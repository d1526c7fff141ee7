// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Provides a non-durable store for embedding the engine in tests or in hosts
// that persist elsewhere.
//
// ## Crash Behavior
//
// - All state is lost on restart
// - The first tick after a restart always updates the provider

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{State, StateStore};

/// In-memory state store implementation
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,no_run
/// use gdddcd_core::state::MemoryStateStore;
/// use gdddcd_core::traits::{State, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::with_state(State::default());
///
///     store.write(&State::new("1.2.3.4")).await?;
///     assert_eq!(store.load().await?.ip, "1.2.3.4");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<State>>>,
}

impl MemoryStateStore {
    /// Create an empty store; `load` fails until something is written
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `state`
    pub fn with_state(state: State) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(state))),
        }
    }

    /// Current record, if any
    pub async fn snapshot(&self) -> Option<State> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<State, Error> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::state_store("No state stored in memory"))
    }

    async fn write(&self, state: &State) -> Result<(), Error> {
        *self.inner.write().await = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_fails_to_load() {
        let store = MemoryStateStore::new();
        assert!(store.load().await.is_err());
        assert_eq!(store.snapshot().await, None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStateStore::with_state(State::default());
        let other = store.clone();

        store.write(&State::new("1.2.3.4")).await.unwrap();

        assert_eq!(other.load().await.unwrap().ip, "1.2.3.4");
    }
}
