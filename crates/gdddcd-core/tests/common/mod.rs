//! Test doubles and common utilities for engine contract tests
//!
//! Every double is cheap to clone and clones share their counters, so a
//! test can hand one copy to the engine and keep another for assertions.

#![allow(dead_code)]

use gdddcd_core::error::{Error, Result};
use gdddcd_core::traits::{DnsProvider, IpSource, State, StateStore, UpdateResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted answer from [`ScriptedIpSource`]
#[derive(Debug, Clone)]
pub enum Discovery {
    Ip(&'static str),
    Fail,
}

/// An IpSource that replays a script, repeating the last entry forever
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<Discovery>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(script: impl IntoIterator<Item = Discovery>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with `ip`
    pub fn fixed(ip: &'static str) -> Self {
        Self::new([Discovery::Ip(ip)])
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let next = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match next {
            Some(Discovery::Ip(ip)) => Ok(ip.to_string()),
            Some(Discovery::Fail) => Err(Error::discovery("transport failed: scripted")),
            None => Err(Error::discovery("transport failed: empty script")),
        }
    }
}

/// How [`MockDnsProvider`] answers
#[derive(Debug, Clone)]
pub enum ProviderBehavior {
    /// `good <ip>`
    Good,
    /// HTTP 200 with an unexpected body
    Acknowledge(&'static str),
    /// Non-200 status
    Reject(u16, &'static str),
    /// Request never completed
    Unreachable,
}

/// A DnsProvider that records every IP it was asked to publish
#[derive(Clone)]
pub struct MockDnsProvider {
    behavior: Arc<Mutex<ProviderBehavior>>,
    updates: Arc<Mutex<Vec<String>>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::with_behavior(ProviderBehavior::Good)
    }

    pub fn with_behavior(behavior: ProviderBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behavior(&self, behavior: ProviderBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Get the IPs passed to update_record(), in order
    pub fn updated_ips(&self) -> Vec<String> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, new_ip: &str) -> Result<UpdateResult> {
        self.updates.lock().unwrap().push(new_ip.to_string());

        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            ProviderBehavior::Good => Ok(UpdateResult::Updated {
                new_ip: new_ip.to_string(),
            }),
            ProviderBehavior::Acknowledge(body) => Ok(UpdateResult::Acknowledged {
                new_ip: new_ip.to_string(),
                response: body.to_string(),
            }),
            ProviderBehavior::Reject(status, body) => Err(Error::ProviderRejected {
                status,
                body: body.to_string(),
            }),
            ProviderBehavior::Unreachable => {
                Err(Error::dns_provider("transport failed: connection refused"))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore that can be told to fail its writes
#[derive(Clone)]
pub struct MockStateStore {
    state: Arc<Mutex<Option<State>>>,
    fail_writes: Arc<AtomicBool>,
    write_call_count: Arc<AtomicUsize>,
}

impl MockStateStore {
    pub fn new(initial: State) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(initial))),
            fail_writes: Arc::new(AtomicBool::new(false)),
            write_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get the number of times write() was called, failed calls included
    pub fn write_call_count(&self) -> usize {
        self.write_call_count.load(Ordering::SeqCst)
    }

    /// IP of the record currently stored
    pub fn stored_ip(&self) -> Option<String> {
        self.state.lock().unwrap().as_ref().map(|s| s.ip.clone())
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn load(&self) -> Result<State> {
        self.state
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::state_store("no state"))
    }

    async fn write(&self, state: &State) -> Result<()> {
        self.write_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::state_store("Failed to create temp file: disk full"));
        }
        *self.state.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}

/// Default period used by the contract tests
pub const TEST_INTERVAL: Duration = Duration::from_secs(60);

/// Build an engine from clones of the given doubles, seeded with the store's record
pub async fn engine_for(
    source: &ScriptedIpSource,
    provider: &MockDnsProvider,
    store: &MockStateStore,
) -> gdddcd_core::DdnsEngine {
    let initial = store.load().await.expect("store seeded");
    gdddcd_core::DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        Box::new(store.clone()),
        initial,
        TEST_INTERVAL,
    )
    .expect("engine construction succeeds")
}
