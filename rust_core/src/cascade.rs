//! Fallback cascade controller.
//!
//! One aggregation cycle:
//! 1. Fan out to every registered adapter concurrently, each bounded by
//!    `adapter_timeout`; anything still running at `cycle_deadline` is aborted
//! 2. Merge successful batches in registry order
//! 3. Classify and normalize records, then apply the request filter
//! 4. Deduplicate and check the authentic count against the quality gate
//! 5. Below the gate, pad each requested sport with synthetic events
//!
//! Adapter failures (errors, timeouts, panics) are recorded in the
//! [`CycleReport`] and never fail the cycle.

use crate::config::AggregatorConfig;
use crate::dedup::dedupe;
use crate::error::{AggregationError, FetchError, FetchErrorKind};
use crate::models::{Event, EventFilter, EventKey, Sport};
use crate::normalize::{normalize_record, SourceInfo};
use crate::providers::{AdapterRegistry, FetchBatch, SourceAdapter};
use futures_util::FutureExt;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

// ============================================================================
// Report types
// ============================================================================

/// What happened to one adapter during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AdapterOutcome {
    /// Returned a batch; `dropped` counts records rejected by the adapter
    /// or by normalization
    Succeeded { raw: usize, dropped: usize },
    Failed { kind: FetchErrorKind },
    Panicked,
    /// Still running at the cycle deadline
    Abandoned,
}

impl AdapterOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AdapterOutcome::Succeeded { .. })
    }
}

/// Summary of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub filter: EventFilter,
    /// Per-adapter outcomes in registry order
    pub adapters: Vec<(String, AdapterOutcome)>,
    /// Authentic events in the final result
    pub authentic: usize,
    /// Synthetic events in the final result
    pub synthetic: usize,
    /// Whether the quality gate triggered synthesis
    pub synthesized: bool,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn succeeded(&self) -> usize {
        self.adapters.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn outcome_for(&self, adapter_id: &str) -> Option<AdapterOutcome> {
        self.adapters
            .iter()
            .find(|(id, _)| id == adapter_id)
            .map(|(_, o)| *o)
    }
}

/// Events plus the report of the cycle that produced them.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub events: Vec<Event>,
    pub report: CycleReport,
}

/// Raw result of one adapter task: a panic, a timeout, or the fetch result.
type TaskResult = Result<Result<Result<FetchBatch, FetchError>, tokio::time::error::Elapsed>, ()>;

// ============================================================================
// Controller
// ============================================================================

pub struct CascadeController {
    registry: Arc<AdapterRegistry>,
    synthesizer: Arc<dyn SourceAdapter>,
    config: AggregatorConfig,
}

impl CascadeController {
    /// Build a controller. The configuration is validated and the
    /// synthesizer must be a synthetic adapter.
    pub fn new(
        registry: Arc<AdapterRegistry>,
        synthesizer: Arc<dyn SourceAdapter>,
        config: AggregatorConfig,
    ) -> Result<Self, AggregationError> {
        config.validate()?;
        if !synthesizer.is_synthetic() {
            return Err(AggregationError::Misconfigured(format!(
                "synthesizer '{}' is not a synthetic adapter",
                synthesizer.adapter_id()
            )));
        }
        if registry.is_empty() {
            warn!("CascadeController has no adapters; every response will be synthetic");
        }

        Ok(Self {
            registry,
            synthesizer,
            config,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Run one aggregation cycle for a request.
    pub async fn run_cycle(&self, filter: &EventFilter) -> Result<CycleOutcome, AggregationError> {
        let started = Instant::now();
        let deadline = started + self.config.cycle_deadline;
        let adapters = self.registry.adapters();

        let (batches, mut outcomes) = self.fan_out(filter, started).await?;

        // Merge in registry order so completion order never matters
        let mut events = Vec::new();
        for (idx, batch) in batches.into_iter().enumerate() {
            let Some(batch) = batch else { continue };
            let adapter = &adapters[idx];
            let source = SourceInfo {
                adapter_id: adapter.adapter_id(),
                tier: adapter.trust_tier(),
                synthetic: adapter.is_synthetic(),
            };

            let raw = batch.records.len();
            let mut dropped = batch.dropped;
            for record in batch.records {
                match normalize_record(record, &source) {
                    Ok(event) if filter.matches(&event) => events.push(event),
                    Ok(_) => {}
                    Err(e) => {
                        debug!("{} record rejected: {}", source.adapter_id, e);
                        dropped += 1;
                    }
                }
            }
            outcomes[idx] = AdapterOutcome::Succeeded { raw, dropped };
        }

        let merged = dedupe(events);
        let authentic = merged.iter().filter(|e| !e.synthetic).count();
        let threshold = self.config.threshold_for(filter);

        let (events, synthesized) = if authentic < threshold {
            info!(
                "Only {} authentic events for {} (need {}), padding with synthetic events",
                authentic, filter, threshold
            );
            let padding = self.synthesize(filter, &merged, deadline).await;
            let mut combined = merged;
            combined.extend(padding);
            (dedupe(combined), true)
        } else {
            (merged, false)
        };

        let synthetic = events.iter().filter(|e| e.synthetic).count();
        let report = CycleReport {
            filter: *filter,
            adapters: adapters
                .iter()
                .map(|a| a.adapter_id().to_string())
                .zip(outcomes)
                .collect(),
            authentic: events.len() - synthetic,
            synthetic,
            synthesized,
            elapsed: started.elapsed(),
        };

        info!(
            "Cycle for {} finished in {:?}: {} authentic, {} synthetic, {}/{} adapters succeeded",
            filter,
            report.elapsed,
            report.authentic,
            report.synthetic,
            report.succeeded(),
            report.adapters.len()
        );

        Ok(CycleOutcome { events, report })
    }

    /// Run every adapter concurrently. Returns the batches of successful
    /// adapters by registry index, and the outcome of the rest.
    async fn fan_out(
        &self,
        filter: &EventFilter,
        started: Instant,
    ) -> Result<(Vec<Option<FetchBatch>>, Vec<AdapterOutcome>), AggregationError> {
        let adapters = self.registry.adapters();
        let mut batches: Vec<Option<FetchBatch>> = vec![None; adapters.len()];
        let mut outcomes = vec![AdapterOutcome::Abandoned; adapters.len()];

        let mut tasks: JoinSet<(usize, TaskResult)> = JoinSet::new();
        for (idx, adapter) in adapters.iter().enumerate() {
            let adapter = Arc::clone(adapter);
            let filter = *filter;
            let adapter_timeout = self.config.adapter_timeout;
            tasks.spawn(async move {
                let fetch = timeout(adapter_timeout, adapter.fetch(&filter));
                let result = AssertUnwindSafe(fetch).catch_unwind().await.map_err(|_| ());
                (idx, result)
            });
        }

        let deadline = tokio::time::sleep_until(started + self.config.cycle_deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    let (idx, result) = match joined {
                        None => break,
                        Some(Ok(done)) => done,
                        Some(Err(e)) if e.is_cancelled() => continue,
                        Some(Err(e)) => {
                            return Err(AggregationError::CycleFailure(format!(
                                "adapter task failed to join: {}",
                                e
                            )))
                        }
                    };

                    let id = adapters[idx].adapter_id();
                    match result {
                        Ok(Ok(Ok(batch))) => {
                            debug!("Adapter {} returned {} records for {}", id, batch.records.len(), filter);
                            batches[idx] = Some(batch);
                        }
                        Ok(Ok(Err(e))) => {
                            warn!("Adapter {} failed for {} ({:?}): {}", id, filter, e.kind(), e);
                            outcomes[idx] = AdapterOutcome::Failed { kind: e.kind() };
                        }
                        Ok(Err(_)) => {
                            warn!(
                                "Adapter {} timed out for {} after {:?}",
                                id, filter, self.config.adapter_timeout
                            );
                            outcomes[idx] = AdapterOutcome::Failed { kind: FetchErrorKind::Timeout };
                        }
                        Err(()) => {
                            warn!("Adapter {} panicked while fetching {}", id, filter);
                            outcomes[idx] = AdapterOutcome::Panicked;
                        }
                    }
                }
                _ = &mut deadline => {
                    let pending = tasks.len();
                    warn!(
                        "Cycle deadline {:?} reached for {}, abandoning {} adapters",
                        self.config.cycle_deadline, filter, pending
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        Ok((batches, outcomes))
    }

    /// Synthetic events padding each requested sport up to the target.
    ///
    /// Generated fixtures that collide with an authentic key are skipped.
    /// Each generator call is also bounded by the cycle deadline; sports
    /// still unfilled when it passes get no padding.
    async fn synthesize(
        &self,
        filter: &EventFilter,
        authentic: &[Event],
        deadline: Instant,
    ) -> Vec<Event> {
        let target = self.config.synthetic_target_per_sport;
        let taken: FxHashSet<EventKey> = authentic.iter().map(Event::key).collect();
        let source = SourceInfo {
            adapter_id: self.synthesizer.adapter_id(),
            tier: self.synthesizer.trust_tier(),
            synthetic: true,
        };

        let mut padding = Vec::new();
        for sport in self.config.synthetic_sports_for(filter) {
            let have = count_sport(authentic, sport);
            let needed = target.saturating_sub(have);
            if needed == 0 {
                continue;
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "Cycle deadline reached while padding {}, skipping remaining sports",
                    filter
                );
                break;
            }

            let request = EventFilter {
                sport: Some(sport),
                live: filter.live,
            };
            let call_deadline = deadline.min(now + self.config.adapter_timeout);
            let batch = match timeout_at(call_deadline, self.synthesizer.fetch(&request)).await {
                Ok(Ok(batch)) => batch,
                Ok(Err(e)) => {
                    warn!("Synthetic generator failed for {}: {}", request, e);
                    continue;
                }
                Err(_) => {
                    warn!("Synthetic generator timed out for {}", request);
                    continue;
                }
            };

            let generated: Vec<Event> = batch
                .records
                .into_iter()
                .filter_map(|record| normalize_record(record, &source).ok())
                .filter(|event| filter.matches(event) && !taken.contains(&event.key()))
                .take(needed)
                .collect();

            if generated.len() < needed {
                debug!(
                    "Synthetic generator produced {} of {} events for {}",
                    generated.len(),
                    needed,
                    sport
                );
            }
            padding.extend(generated);
        }

        padding
    }
}

fn count_sport(events: &[Event], sport: Sport) -> usize {
    events.iter().filter(|e| e.sport == sport).count()
}
