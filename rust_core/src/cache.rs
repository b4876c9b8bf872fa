//! Request-shape keyed event cache.
//!
//! - Entries expire after a per-write TTL
//! - Writes carry a [`CycleTicket`]; a write from an older cycle, or from a
//!   cycle started before the last [`EventCache::invalidate_all`], is dropped
//! - Results containing authentic events are kept as last-known-good for a
//!   grace period after they expire
//!
//! Uses `parking_lot::RwLock` for fast synchronous access; no lock is held
//! across an await point.

use crate::models::{Event, EventFilter, Sport};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cache key: `(sport | all, live | all)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub sport: Option<Sport>,
    pub live: Option<bool>,
}

impl From<&EventFilter> for CacheKey {
    fn from(filter: &EventFilter) -> Self {
        Self {
            sport: filter.sport,
            live: filter.live,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = EventFilter {
            sport: self.sport,
            live: self.live,
        };
        write!(f, "{}", filter)
    }
}

/// Identifies one aggregation cycle. Orders by invalidation epoch, then by
/// start order within the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleTicket {
    pub epoch: u64,
    pub seq: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    events: Vec<Event>,
    expires_at: Instant,
    ticket: CycleTicket,
}

#[derive(Debug, Clone)]
struct GoodEntry {
    events: Vec<Event>,
    good_until: Instant,
    ticket: CycleTicket,
}

#[derive(Debug, Default)]
struct CacheState {
    epoch: u64,
    next_seq: u64,
    entries: FxHashMap<CacheKey, CacheEntry>,
    last_good: FxHashMap<CacheKey, GoodEntry>,
}

impl CacheState {
    fn accepts(&self, key: &CacheKey, ticket: CycleTicket) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        self.entries.get(key).map_or(true, |e| e.ticket <= ticket)
    }
}

/// Thread-safe event cache.
#[derive(Debug)]
pub struct EventCache {
    state: RwLock<CacheState>,
    stale_grace: Duration,
}

impl EventCache {
    /// Create an empty cache keeping last-known-good results for
    /// `stale_grace` past their expiry.
    pub fn new(stale_grace: Duration) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            stale_grace,
        }
    }

    /// Start a cycle and get the ticket its writes must carry.
    pub fn begin_cycle(&self) -> CycleTicket {
        let mut state = self.state.write();
        let ticket = CycleTicket {
            epoch: state.epoch,
            seq: state.next_seq,
        };
        state.next_seq += 1;
        ticket
    }

    /// Fresh events for a key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Event>> {
        let now = Instant::now();
        let state = self.state.read();
        state
            .entries
            .get(key)
            .filter(|e| now < e.expires_at)
            .map(|e| e.events.clone())
    }

    /// Store the result of a cycle.
    ///
    /// Returns false if the write was dropped because a newer cycle already
    /// wrote this key or the cache was invalidated after the cycle began.
    pub fn put(&self, key: CacheKey, events: Vec<Event>, ttl: Duration, ticket: CycleTicket) -> bool {
        let now = Instant::now();
        let mut state = self.state.write();

        if !state.accepts(&key, ticket) {
            debug!("Dropping stale cache write for {} from cycle {:?}", key, ticket);
            return false;
        }

        let expires_at = now + ttl;
        if events.iter().any(|e| !e.synthetic) {
            state.last_good.insert(
                key,
                GoodEntry {
                    events: events.clone(),
                    good_until: expires_at + self.stale_grace,
                    ticket,
                },
            );
        }
        state.entries.insert(
            key,
            CacheEntry {
                events,
                expires_at,
                ticket,
            },
        );
        true
    }

    /// Last authentic result for a key, if still within its grace period.
    pub fn last_known_good(&self, key: &CacheKey) -> Option<Vec<Event>> {
        let now = Instant::now();
        let state = self.state.read();
        state
            .last_good
            .get(key)
            .filter(|g| now < g.good_until)
            .map(|g| g.events.clone())
    }

    /// Re-install the last-known-good result as the fresh entry for `ttl`.
    ///
    /// Used when a cycle produced nothing authentic. The grace period is not
    /// extended, so stale data eventually ages out. Returns the events served,
    /// or `None` if there is nothing usable or the ticket is stale.
    pub fn serve_last_known_good(
        &self,
        key: CacheKey,
        ttl: Duration,
        ticket: CycleTicket,
    ) -> Option<Vec<Event>> {
        let now = Instant::now();
        let mut state = self.state.write();

        if !state.accepts(&key, ticket) {
            return None;
        }

        let good = state.last_good.get(&key).filter(|g| now < g.good_until)?;
        debug!(
            "Serving last-known-good for {} (cycle {:?})",
            key, good.ticket
        );
        let events = good.events.clone();
        let expires_at = (now + ttl).min(good.good_until);
        state.entries.insert(
            key,
            CacheEntry {
                events: events.clone(),
                expires_at,
                ticket,
            },
        );
        Some(events)
    }

    /// Drop every entry and reject writes from cycles already in flight.
    pub fn invalidate_all(&self) {
        let mut state = self.state.write();
        state.epoch += 1;
        state.entries.clear();
        state.last_good.clear();
        debug!("Event cache invalidated (epoch {})", state.epoch);
    }

    /// Number of stored entries, fresh or expired.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
