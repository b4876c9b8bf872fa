//! Aggregation facade.
//!
//! Entry point for callers: cache lookup, per-key single-flight, one cascade
//! cycle on a miss, last-known-good substitution, cache population.

use crate::cache::{CacheKey, EventCache};
use crate::cascade::{CascadeController, CycleReport};
use crate::config::{AggregatorConfig, ProviderConfig};
use crate::error::AggregationError;
use crate::models::{Event, EventFilter};
use crate::providers::{AdapterRegistry, SourceAdapter, SyntheticGenerator};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Live/upcoming event aggregator.
pub struct EventAggregator {
    cascade: CascadeController,
    cache: EventCache,
    /// One gate per cache key; concurrent misses queue behind the first
    inflight: Mutex<FxHashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl EventAggregator {
    /// Build an aggregator over a registry with the default synthetic
    /// generator.
    pub fn new(registry: AdapterRegistry, config: AggregatorConfig) -> Result<Self, AggregationError> {
        let synthesizer = Arc::new(SyntheticGenerator::new(
            config.synthetic_target_per_sport,
            config.synthetic_sports.clone(),
        ));
        Self::with_synthesizer(registry, synthesizer, config)
    }

    /// Build an aggregator with a specific synthetic adapter.
    pub fn with_synthesizer(
        registry: AdapterRegistry,
        synthesizer: Arc<dyn SourceAdapter>,
        config: AggregatorConfig,
    ) -> Result<Self, AggregationError> {
        let cache = EventCache::new(config.stale_grace);
        let cascade = CascadeController::new(Arc::new(registry), synthesizer, config)?;
        Ok(Self {
            cascade,
            cache,
            inflight: Mutex::new(FxHashMap::default()),
        })
    }

    /// Build the default adapters and settings from the environment.
    pub fn from_env() -> Result<Self, AggregationError> {
        let config = AggregatorConfig::from_env()?;
        let registry = AdapterRegistry::with_defaults(&ProviderConfig::from_env());
        Self::new(registry, config)
    }

    pub fn config(&self) -> &AggregatorConfig {
        self.cascade.config()
    }

    pub fn adapters(&self) -> Vec<String> {
        self.cascade.registry().list_adapters()
    }

    /// Events for a request. Never fails for lack of data; a response with
    /// nothing authentic is padded with synthetic events.
    pub async fn get_events(&self, filter: EventFilter) -> Result<Vec<Event>, AggregationError> {
        let key = CacheKey::from(&filter);
        if let Some(events) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(events);
        }

        let gate = self.gate(key);
        let _flight = gate.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some(events) = self.cache.get(&key) {
            debug!("Cache filled while waiting for {}", key);
            return Ok(events);
        }

        let (events, _) = self.run_and_store(key, &filter).await?;
        Ok(events)
    }

    /// Run a cycle for a request regardless of the cache and store the
    /// result. Used to keep entries warm.
    pub async fn refresh(&self, filter: EventFilter) -> Result<CycleReport, AggregationError> {
        let key = CacheKey::from(&filter);
        let gate = self.gate(key);
        let _flight = gate.lock().await;

        let (_, report) = self.run_and_store(key, &filter).await?;
        Ok(report)
    }

    /// Drop every cached result. Cycles already in flight cannot write back.
    pub fn invalidate_cache(&self) {
        info!("Invalidating event cache");
        self.cache.invalidate_all();
    }

    fn gate(&self, key: CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock();
        Arc::clone(inflight.entry(key).or_default())
    }

    async fn run_and_store(
        &self,
        key: CacheKey,
        filter: &EventFilter,
    ) -> Result<(Vec<Event>, CycleReport), AggregationError> {
        let ticket = self.cache.begin_cycle();
        let outcome = self.cascade.run_cycle(filter).await?;
        let ttl = self.config().ttl_for(filter);

        // Stale authentic data beats a synthetic-only answer
        if outcome.report.authentic == 0 {
            if let Some(stale) = self.cache.serve_last_known_good(key, ttl, ticket) {
                info!(
                    "No authentic events for {}; serving {} last-known-good events",
                    key,
                    stale.len()
                );
                return Ok((stale, outcome.report));
            }
        }

        if !self.cache.put(key, outcome.events.clone(), ttl, ticket) {
            debug!("Cycle result for {} not cached (superseded)", key);
        }
        Ok((outcome.events, outcome.report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sport;

    #[tokio::test]
    async fn test_empty_registry_serves_synthetic_and_caches() {
        let aggregator = EventAggregator::new(AdapterRegistry::new(), AggregatorConfig::default()).unwrap();

        let first = aggregator
            .get_events(EventFilter::sport(Sport::Basketball))
            .await
            .unwrap();
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|e| e.synthetic && e.sport == Sport::Basketball));

        // Served from cache: identical ids
        let second = aggregator
            .get_events(EventFilter::sport(Sport::Basketball))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_misconfiguration_rejected() {
        let config = AggregatorConfig {
            synthetic_target_per_sport: 0,
            ..AggregatorConfig::default()
        };
        let result = EventAggregator::new(AdapterRegistry::new(), config);
        assert!(matches!(result, Err(AggregationError::Misconfigured(_))));
    }
}
