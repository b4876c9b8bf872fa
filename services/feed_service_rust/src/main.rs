mod config;

use crate::config::ServiceConfig;
use anyhow::{Context, Result};
use courtside_core::{EventAggregator, EventFilter};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Courtside feed service...");

    let service_config = ServiceConfig::from_env().context("Invalid feed service configuration")?;
    let aggregator = Arc::new(
        EventAggregator::from_env().context("Failed to initialize event aggregator")?,
    );

    info!(
        "Adapters: {:?}; warming {} filters every {:?}",
        aggregator.adapters(),
        service_config.warm_filters.len(),
        service_config.refresh_interval
    );

    // Refresh loop keeps the configured requests warm in the cache
    let refresher = Arc::clone(&aggregator);
    let config = service_config.clone();
    let refresh_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.refresh_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            for filter in &config.warm_filters {
                refresh_one(&refresher, *filter, config.dump_events).await;
            }
        }
    });

    // Wait for signal
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    refresh_task.abort();
    aggregator.invalidate_cache();
    info!("Feed service stopped");
    Ok(())
}

async fn refresh_one(aggregator: &EventAggregator, filter: EventFilter, dump_events: bool) {
    match aggregator.refresh(filter).await {
        Ok(report) => {
            if report.succeeded() == 0 && !report.adapters.is_empty() {
                warn!("Every adapter failed for {}", filter);
            }
            match serde_json::to_string(&report.adapters) {
                Ok(outcomes) => debug!("Adapter outcomes for {}: {}", filter, outcomes),
                Err(e) => warn!("Failed to serialize cycle report: {}", e),
            }
        }
        Err(e) => {
            error!("Refresh failed for {}: {}", filter, e);
            return;
        }
    }

    if dump_events {
        match aggregator.get_events(filter).await {
            Ok(events) => {
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        debug!("{}", json);
                    }
                }
            }
            Err(e) => warn!("Failed to read events for {}: {}", filter, e),
        }
    }
}
