//! Courtside Core - live and upcoming sports event aggregation.
//!
//! This module provides:
//! - Source adapters for ESPN scoreboards, TheSportsDB and The Odds API
//! - A static sport taxonomy with provider aliases and draw eligibility
//! - Deterministic sport classification
//! - Normalization into one canonical event model
//! - Hash-based deduplication with trust-tier precedence
//! - A ticketed TTL cache with last-known-good retention
//! - A fallback cascade that pads thin results with synthetic events
//! - The `EventAggregator` facade tying it all together

pub mod aggregator;
pub mod cache;
pub mod cascade;
pub mod classifier;
pub mod clients;
pub mod config;
pub mod dedup;
pub mod error;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod sport_config;
pub mod utils;

pub use aggregator::EventAggregator;
pub use cache::{CacheKey, CycleTicket, EventCache};
pub use cascade::{AdapterOutcome, CascadeController, CycleOutcome, CycleReport};
pub use classifier::{classify, classify_with_context, Classification, ClassifyContext};
pub use config::{AggregatorConfig, ProviderConfig};
pub use dedup::dedupe;
pub use error::{AggregationError, FetchError, FetchErrorKind, NormalizeError};
pub use models::{Confidence, Event, EventFilter, EventStatus, Odds, Provenance, Sport};
pub use providers::{
    AdapterRegistry, FetchBatch, RawEvent, RawOdds, RecordOutcome, SourceAdapter, SportLabel,
    SyntheticGenerator,
};
