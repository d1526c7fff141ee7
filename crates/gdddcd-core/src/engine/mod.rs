//! Core reconciliation engine
//!
//! The DdnsEngine is responsible for:
//! - Discovering the current public IP via IpSource
//! - Telling the DnsProvider when the IP differs from what it last acknowledged
//! - Persisting the IP via StateStore when it differs from what is stored
//!
//! ## Architecture
//!
//! ```text
//!   ticker ──► tick() ──► IpSource::current()
//!                │
//!                ├──► DnsProvider::update_record()   if current != acknowledged_ip
//!                │
//!                └──► StateStore::write()            if current != persisted.ip
//! ```
//!
//! ## Two Trackers
//!
//! `acknowledged_ip` is what the provider was last told; it changes only
//! after a successful provider call. `persisted` is what is on disk; it
//! changes only after a successful write. Both are seeded from the state
//! loaded at startup and may diverge while writes keep failing. Because the
//! provider comparison uses `acknowledged_ip`, a crash between a provider
//! update and the state write heals itself on the next tick.
//!
//! ## Failure Policy
//!
//! Every failure is logged and retried on the next tick, with no backoff.
//! A failed provider update ends the tick before the state comparison, so a
//! new IP is never persisted before the provider accepted it.

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IpSource, State, StateStore, UpdateResult};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What happened to the state record during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateWrite {
    /// Stored IP already matched
    NotNeeded,
    /// New record written and adopted
    Written,
    /// Write failed; the previous record is kept
    Failed,
}

/// Result of a single reconciliation tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// IP discovery failed; nothing was compared or changed
    DiscoveryFailed,

    /// The provider update failed; the state comparison was skipped
    UpdateFailed {
        current_ip: String,
    },

    /// The tick ran to the end
    Completed {
        current_ip: String,
        /// Whether the provider was called (and accepted the update)
        provider_updated: bool,
        state: StateWrite,
    },
}

/// Core reconciliation engine
///
/// ## Lifecycle
///
/// 1. Load the initial [`State`] (a failure there is fatal to the caller)
/// 2. Create with [`DdnsEngine::new()`]
/// 3. Drive with [`DdnsEngine::run()`], or call [`DdnsEngine::tick()`] directly
/// 4. Cancel the token to stop between ticks
///
/// ## Threading
///
/// All work happens on the calling task, strictly in order: discovery,
/// provider update, state write. A tick never overlaps the next one.
pub struct DdnsEngine {
    /// IP source for discovery
    ip_source: Box<dyn IpSource>,

    /// DNS provider for updating the record
    provider: Box<dyn DnsProvider>,

    /// Durable storage for the last known IP
    state_store: Box<dyn StateStore>,

    /// Period between ticks
    update_interval: Duration,

    /// What the provider was last told
    acknowledged_ip: String,

    /// Last record successfully written to the store
    persisted: State,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `state_store`: State store implementation
    /// - `initial_state`: State loaded at startup; seeds both trackers
    /// - `update_interval`: Period of [`DdnsEngine::run()`]
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        initial_state: State,
        update_interval: Duration,
    ) -> Result<Self> {
        if update_interval.is_zero() {
            return Err(Error::config("update interval must be greater than zero"));
        }

        Ok(Self {
            ip_source,
            provider,
            state_store,
            update_interval,
            acknowledged_ip: initial_state.ip.clone(),
            persisted: initial_state,
        })
    }

    /// What the provider was last told the IP is
    pub fn acknowledged_ip(&self) -> &str {
        &self.acknowledged_ip
    }

    /// Last record successfully written to the store
    pub fn persisted_state(&self) -> &State {
        &self.persisted
    }

    /// Period between ticks in [`DdnsEngine::run()`]
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Run on a fixed timer until `shutdown` is cancelled
    ///
    /// The first tick fires one full period after the call. Ticks missed
    /// while a slow tick was running are skipped, not queued.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let mut interval = interval_at(Instant::now() + self.update_interval, self.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Starting: will check & update IP every {:?}",
            self.update_interval
        );
        self.run_with_ticker(IntervalStream::new(interval), shutdown)
            .await;
    }

    /// Run one tick per item yielded by `ticker`
    ///
    /// Returns when `shutdown` is cancelled or the ticker ends. Cancellation
    /// is observed between ticks; a tick that has started always finishes.
    pub async fn run_with_ticker<T>(&mut self, mut ticker: T, shutdown: CancellationToken)
    where
        T: Stream + Unpin,
    {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }

                next = ticker.next() => {
                    if next.is_none() {
                        debug!("Ticker finished");
                        break;
                    }
                    self.tick().await;
                }
            }
        }

        info!(
            "Engine stopped (acknowledged IP {:?}, persisted IP {:?})",
            self.acknowledged_ip, self.persisted.ip
        );
    }

    /// Run a single reconciliation pass
    pub async fn tick(&mut self) -> TickOutcome {
        debug!("Checking IP");
        let current_ip = match self.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("Could not check IP: {}", e);
                return TickOutcome::DiscoveryFailed;
            }
        };

        let mut provider_updated = false;
        if current_ip != self.acknowledged_ip {
            info!(
                "Detected new IP ({:?} -> {:?}), updating {}",
                self.acknowledged_ip,
                current_ip,
                self.provider.provider_name()
            );

            match self.provider.update_record(&current_ip).await {
                Ok(UpdateResult::Updated { .. }) => {
                    info!("Provider confirmed IP {}", current_ip);
                }
                Ok(UpdateResult::Acknowledged { response, .. }) => {
                    debug!("Provider accepted IP {} with {:?}", current_ip, response);
                }
                Err(e) => {
                    error!("Could not update IP: {}", e);
                    return TickOutcome::UpdateFailed { current_ip };
                }
            }

            self.acknowledged_ip = current_ip.clone();
            provider_updated = true;
        }

        let state = if current_ip != self.persisted.ip {
            let candidate = self.persisted.with_ip(current_ip.as_str());
            match self.state_store.write(&candidate).await {
                Ok(()) => {
                    debug!("Persisted IP {}", current_ip);
                    self.persisted = candidate;
                    StateWrite::Written
                }
                Err(e) => {
                    error!("Could not update on-disk state: {}", e);
                    StateWrite::Failed
                }
            }
        } else {
            StateWrite::NotNeeded
        };

        TickOutcome::Completed {
            current_ip,
            provider_updated,
            state,
        }
    }
}
