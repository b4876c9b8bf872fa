//! Source adapter abstractions
//!
//! Defines the SourceAdapter trait that every event source implements
//! (public scoreboards, sports databases, paid odds APIs, and the synthetic
//! generator) and the raw record shape they produce.

use crate::error::FetchError;
use crate::models::{EventFilter, EventStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

// Concrete adapter implementations
pub mod espn;
pub mod odds_api;
pub mod registry;
pub mod sportsdb;
pub mod synthetic;

// Re-export registry for convenient access
pub use registry::AdapterRegistry;
pub use synthetic::SyntheticGenerator;

/// Universal source adapter trait
///
/// Implementations turn one provider's payloads into raw records:
/// - Tier 1: ESPN scoreboards
/// - Tier 2: TheSportsDB
/// - Tier 3: The Odds API
/// - Last: the synthetic generator
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable adapter id, used in event ids and logs
    fn adapter_id(&self) -> &str;

    /// Trust tier; lower is more trusted
    fn trust_tier(&self) -> u8;

    /// Whether records from this adapter are generated rather than observed
    fn is_synthetic(&self) -> bool {
        false
    }

    /// Fetch raw records for a request.
    ///
    /// "No data" is an empty batch, not an error. Records the adapter could
    /// not parse are counted in the batch and never fail the call.
    async fn fetch(&self, filter: &EventFilter) -> Result<FetchBatch, FetchError>;
}

/// Sport as the provider labels it, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportLabel {
    Name(String),
    Id(i64),
}

/// Decimal prices as the provider reported them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawOdds {
    pub home: f64,
    pub away: f64,
    pub draw: Option<f64>,
}

/// One provider record in canonical shape, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Provider-local id
    pub source_id: String,
    pub sport: SportLabel,
    pub league: String,
    pub home: String,
    pub away: String,
    pub start_time: DateTime<Utc>,
    pub live: bool,
    pub status: EventStatus,
    pub score: Option<(u32, u32)>,
    pub odds: Option<RawOdds>,
    pub fetched_at: DateTime<Utc>,
}

/// Result of mapping one provider record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Parsed(RawEvent),
    Dropped(String),
}

/// Everything one adapter produced for a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchBatch {
    pub records: Vec<RawEvent>,
    /// Provider records that could not be mapped
    pub dropped: usize,
}

impl FetchBatch {
    pub fn new(records: Vec<RawEvent>) -> Self {
        Self { records, dropped: 0 }
    }

    /// Append another batch (e.g. one league of several).
    pub fn extend(&mut self, other: FetchBatch) {
        self.records.extend(other.records);
        self.dropped += other.dropped;
    }
}

/// Split per-record outcomes into a batch, logging each drop.
pub fn collect_records<I>(adapter_id: &str, outcomes: I) -> FetchBatch
where
    I: IntoIterator<Item = RecordOutcome>,
{
    let mut batch = FetchBatch::default();
    for outcome in outcomes {
        match outcome {
            RecordOutcome::Parsed(raw) => batch.records.push(raw),
            RecordOutcome::Dropped(reason) => {
                debug!("{} dropped record: {}", adapter_id, reason);
                batch.dropped += 1;
            }
        }
    }
    batch
}
