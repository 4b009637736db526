//! In-memory revocation store for tests and single-process development

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::{PrincipalId, RevocationKey};
use crate::errors::DomainError;

use super::trait_::RevocationStore;

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, (PrincipalId, DateTime<Utc>)>,
    sessions: HashMap<PrincipalId, HashSet<String>>,
}

impl State {
    /// Drop lapsed entries and index members pointing at them
    fn prune(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);

        let entries = &self.entries;
        self.sessions.retain(|_, keys| {
            keys.retain(|key| entries.contains_key(key));
            !keys.is_empty()
        });
    }
}

/// Revocation store backed by a `HashMap` guarded by a tokio `RwLock`
///
/// Expiry is evaluated against the injected [`Clock`], so moving a
/// `ManualClock` forward makes entries lapse exactly like Redis TTLs would.
/// Lapsed entries are swept on every write. Clones share the same map.
#[derive(Debug, Clone)]
pub struct InMemoryRevocationStore {
    state: Arc<RwLock<State>>,
    clock: Arc<dyn Clock>,
    available: Arc<AtomicBool>,
}

impl InMemoryRevocationStore {
    /// Create a new store on wall-clock time
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new store reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate an outage: every operation fails with `StoreUnavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Whether a live entry exists, bypassing the availability switch
    pub async fn contains(&self, key: &RevocationKey) -> bool {
        let now = self.clock.now();
        let state = self.state.read().await;
        matches!(state.entries.get(&key.to_string()), Some((_, expires_at)) if *expires_at > now)
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let state = self.state.read().await;
        state
            .entries
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of stored entries, lapsed ones included
    pub async fn stored(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Remove every entry
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.sessions.clear();
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DomainError::store_unavailable("in-memory store switched off"))
        }
    }
}

impl Default for InMemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn put(
        &self,
        key: &RevocationKey,
        principal_id: PrincipalId,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        if ttl.is_zero() {
            return Ok(());
        }

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| DomainError::internal(format!("TTL out of range: {}", e)))?;
        let now = self.clock.now();

        let mut state = self.state.write().await;
        state.prune(now);
        state.entries.insert(key.to_string(), (principal_id, now + ttl));
        Ok(())
    }

    async fn get(&self, key: &RevocationKey) -> Result<Option<PrincipalId>, DomainError> {
        self.ensure_available()?;
        let now = self.clock.now();
        let state = self.state.read().await;
        Ok(state
            .entries
            .get(&key.to_string())
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(principal_id, _)| *principal_id))
    }

    async fn delete(&self, key: &RevocationKey) -> Result<bool, DomainError> {
        self.ensure_available()?;
        let now = self.clock.now();
        let mut state = self.state.write().await;
        Ok(matches!(
            state.entries.remove(&key.to_string()),
            Some((_, expires_at)) if expires_at > now
        ))
    }

    async fn track_session(
        &self,
        principal_id: PrincipalId,
        key: &RevocationKey,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        if ttl.is_zero() {
            return Ok(());
        }

        // Members expire with their entries, so the index needs no TTL of its own
        let mut state = self.state.write().await;
        state
            .sessions
            .entry(principal_id)
            .or_default()
            .insert(key.to_string());
        Ok(())
    }

    async fn revoke_sessions(&self, principal_id: PrincipalId) -> Result<usize, DomainError> {
        self.ensure_available()?;
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let Some(keys) = state.sessions.remove(&principal_id) else {
            return Ok(0);
        };

        Ok(keys
            .iter()
            .filter(|key| {
                matches!(
                    state.entries.remove(key.as_str()),
                    Some((_, expires_at)) if expires_at > now
                )
            })
            .count())
    }
}
