//! Short-lived cache of provider observations
//!
//! Current conditions change slowly relative to request rates, so repeated
//! evaluations of the same point reuse one observation until it expires.
//! Failures are never cached.

use crate::core_types::{Coordinates, WeatherObservation};
use rustc_hash::FxHashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

type Entries = FxHashMap<(i64, i64), (Instant, WeatherObservation)>;

#[derive(Debug)]
pub struct ObservationCache {
    ttl: Duration,
    entries: Mutex<Entries>,
}

impl ObservationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// The map holds only plain values, so a panic elsewhere while holding
    /// the lock cannot leave it half-updated; keep using it.
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("observation cache lock was poisoned, recovering");
            self.entries.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    /// Fresh observation for `coords`, if one was stored within the TTL
    pub fn get(&self, coords: &Coordinates) -> Option<WeatherObservation> {
        let mut entries = self.lock();
        let key = coords.grid_key();
        let fresh = entries
            .get(&key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, obs)| *obs);
        if fresh.is_none() {
            entries.remove(&key);
        }
        fresh
    }

    pub fn insert(&self, coords: &Coordinates, obs: WeatherObservation) {
        let ttl = self.ttl;
        let mut entries = self.lock();
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(coords.grid_key(), (Instant::now(), obs));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
