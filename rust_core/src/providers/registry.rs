//! Source Adapter Registry
//!
//! Holds the ordered list of adapters the cascade fans out to. Order is by
//! trust tier (most trusted first), then registration order.

use super::espn::EspnAdapter;
use super::odds_api::OddsApiAdapter;
use super::sportsdb::SportsDbAdapter;
use super::SourceAdapter;
use crate::config::ProviderConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered registry of source adapters
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry with the built-in adapters.
    ///
    /// The Odds API is only registered when an API key is configured.
    pub fn with_defaults(config: &ProviderConfig) -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(EspnAdapter::new(&config.espn)));
        registry.register(Arc::new(SportsDbAdapter::new(&config.sportsdb)));

        match OddsApiAdapter::from_config(&config.odds_api) {
            Some(adapter) => registry.register(Arc::new(adapter)),
            None => info!("ODDS_API_KEY not set, The Odds API adapter disabled"),
        }

        info!(
            "AdapterRegistry initialized with {} adapters: {:?}",
            registry.len(),
            registry.list_adapters()
        );

        registry
    }

    /// Register an adapter. An adapter with the same id is replaced.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        let id = adapter.adapter_id().to_string();
        if let Some(pos) = self.adapters.iter().position(|a| a.adapter_id() == id) {
            warn!("Replacing already registered adapter: {}", id);
            self.adapters.remove(pos);
        }

        info!("Registering adapter: {} (tier {})", id, adapter.trust_tier());
        // Stable insert keeps registration order within a tier
        let tier = adapter.trust_tier();
        let pos = self
            .adapters
            .iter()
            .position(|a| a.trust_tier() > tier)
            .unwrap_or(self.adapters.len());
        self.adapters.insert(pos, adapter);
    }

    /// Adapters in fan-out order
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    /// List registered adapter ids in order
    pub fn list_adapters(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.adapter_id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OddsApiConfig;
    use crate::error::FetchError;
    use crate::models::EventFilter;
    use crate::providers::FetchBatch;
    use async_trait::async_trait;

    struct Fixed {
        id: &'static str,
        tier: u8,
    }

    #[async_trait]
    impl SourceAdapter for Fixed {
        fn adapter_id(&self) -> &str {
            self.id
        }

        fn trust_tier(&self) -> u8 {
            self.tier
        }

        async fn fetch(&self, _filter: &EventFilter) -> Result<FetchBatch, FetchError> {
            Ok(FetchBatch::default())
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = AdapterRegistry::new();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ordered_by_tier_then_registration() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(Fixed { id: "c", tier: 3 }));
        registry.register(Arc::new(Fixed { id: "a1", tier: 1 }));
        registry.register(Arc::new(Fixed { id: "b", tier: 2 }));
        registry.register(Arc::new(Fixed { id: "a2", tier: 1 }));

        assert_eq!(registry.list_adapters(), vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(Fixed { id: "a", tier: 1 }));
        registry.register(Arc::new(Fixed { id: "a", tier: 4 }));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.adapters()[0].trust_tier(), 4);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = AdapterRegistry::with_defaults(&ProviderConfig::default());
        assert_eq!(registry.list_adapters(), vec!["espn", "thesportsdb"]);

        let config = ProviderConfig {
            odds_api: OddsApiConfig {
                api_key: Some("key".to_string()),
                ..OddsApiConfig::default()
            },
            ..ProviderConfig::default()
        };
        let registry = AdapterRegistry::with_defaults(&config);
        assert_eq!(
            registry.list_adapters(),
            vec!["espn", "thesportsdb", "the_odds_api"]
        );
    }
}
