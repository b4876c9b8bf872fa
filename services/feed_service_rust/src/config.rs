//! Configuration for feed_service_rust

use anyhow::{anyhow, Result};
use courtside_core::EventFilter;
use std::env;
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_WARM_FILTERS: &str = "all:all,all:live";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Pause between warm-up rounds
    pub refresh_interval: Duration,
    /// Requests kept warm in the cache, refreshed every round
    pub warm_filters: Vec<EventFilter>,
    /// Log every served event as JSON at debug level
    pub dump_events: bool,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let refresh_secs = match env::var("FEED_REFRESH_INTERVAL_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("FEED_REFRESH_INTERVAL_SECS must be a whole number, got '{}'", raw))?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };
        if refresh_secs == 0 {
            return Err(anyhow!("FEED_REFRESH_INTERVAL_SECS must be > 0"));
        }

        let filters = env::var("FEED_WARM_FILTERS").unwrap_or_else(|_| DEFAULT_WARM_FILTERS.to_string());
        let warm_filters = parse_filters(&filters)?;

        let dump_events = env::var("FEED_DUMP_EVENTS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            refresh_interval: Duration::from_secs(refresh_secs),
            warm_filters,
            dump_events,
        })
    }
}

/// Parse a comma separated list of `sport:live` filters.
pub fn parse_filters(raw: &str) -> Result<Vec<EventFilter>> {
    let filters = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| EventFilter::parse(s).ok_or_else(|| anyhow!("Invalid filter in FEED_WARM_FILTERS: '{}'", s)))
        .collect::<Result<Vec<_>>>()?;

    if filters.is_empty() {
        return Err(anyhow!("FEED_WARM_FILTERS must name at least one filter"));
    }
    Ok(filters)
}
