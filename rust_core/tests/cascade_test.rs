//! Integration tests for the aggregation path: fan-out, timeouts, dedup
//! precedence, the quality gate, caching and single-flight.
//!
//! Adapters are in-process mocks; most tests run on paused tokio time so
//! multi-second delays complete instantly.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use courtside_core::{
    AdapterOutcome, AdapterRegistry, AggregationError, AggregatorConfig, EventAggregator,
    EventFilter, EventStatus, FetchBatch, FetchError, FetchErrorKind, RawEvent, RawOdds,
    SourceAdapter, Sport, SportLabel, SyntheticGenerator,
};
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TEST HELPERS
// ============================================================================

#[derive(Clone)]
enum Behavior {
    Records(Vec<RawEvent>),
    Fail(FetchError),
    Panic,
    /// Block the worker thread; cannot be interrupted by a timeout
    Block(Duration),
}

struct MockAdapter {
    id: &'static str,
    tier: u8,
    delay: Duration,
    synthetic: bool,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockAdapter {
    fn new(id: &'static str, tier: u8, behavior: Behavior) -> Self {
        Self {
            id,
            tier,
            delay: Duration::ZERO,
            synthetic: false,
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn records(id: &'static str, tier: u8, records: Vec<RawEvent>) -> Self {
        Self::new(id, tier, Behavior::Records(records))
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn as_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn adapter_id(&self) -> &str {
        self.id
    }

    fn trust_tier(&self) -> u8 {
        self.tier
    }

    fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<FetchBatch, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Unreachable(format!("{} is down", self.id)));
        }

        match &self.behavior {
            Behavior::Records(records) => Ok(FetchBatch::new(
                records
                    .iter()
                    .filter(|r| filter.live.map_or(true, |live| live == r.live))
                    .cloned()
                    .collect(),
            )),
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Panic => panic!("{} exploded", self.id),
            Behavior::Block(duration) => {
                std::thread::sleep(*duration);
                Ok(FetchBatch::default())
            }
        }
    }
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 14, 0, 0).unwrap()
}

fn raw(source_id: &str, sport: &str, home: &str, away: &str, live: bool) -> RawEvent {
    RawEvent {
        source_id: source_id.to_string(),
        sport: SportLabel::Name(sport.to_string()),
        league: String::new(),
        home: home.to_string(),
        away: away.to_string(),
        start_time: fixed_time(),
        live,
        status: if live {
            EventStatus::InProgress
        } else {
            EventStatus::Scheduled
        },
        score: if live { Some((1, 0)) } else { None },
        odds: Some(RawOdds {
            home: 2.0,
            away: 3.0,
            draw: None,
        }),
        fetched_at: fixed_time(),
    }
}

fn football_fixtures() -> Vec<RawEvent> {
    vec![
        raw("1", "soccer", "Arsenal", "Chelsea", true),
        raw("2", "soccer", "Liverpool", "Everton", false),
        raw("3", "soccer", "Leeds United", "Burnley", false),
        raw("4", "soccer", "Tottenham Hotspur", "Fulham", true),
        raw("5", "soccer", "Brighton", "Wolves", false),
    ]
}

fn config() -> AggregatorConfig {
    AggregatorConfig {
        synthetic_sports: vec![Sport::Football, Sport::Basketball],
        ..AggregatorConfig::default()
    }
}

fn aggregator(adapters: Vec<Arc<dyn SourceAdapter>>, config: AggregatorConfig) -> EventAggregator {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    let synthesizer = Arc::new(SyntheticGenerator::with_seed(
        config.synthetic_target_per_sport,
        config.synthetic_sports.clone(),
        42,
    ));
    EventAggregator::with_synthesizer(registry, synthesizer, config).unwrap()
}

// ============================================================================
// TEST: FAN-OUT AND PRECEDENCE
// ============================================================================

/// Scenario:
/// - A never answers within the adapter timeout
/// - B returns five football fixtures
/// - C returns two of B's fixtures with different casing
#[tokio::test(start_paused = true)]
async fn test_slow_adapter_skipped_and_duplicates_merged() {
    let slow = MockAdapter::records("a", 1, football_fixtures()).with_delay(Duration::from_secs(30));
    let primary = MockAdapter::records("b", 2, football_fixtures());
    let secondary = MockAdapter::records(
        "c",
        3,
        vec![
            raw("x1", "soccer", "arsenal", "CHELSEA", true),
            raw("x2", "soccer", " liverpool ", "Everton", false),
        ],
    );

    let agg = aggregator(
        vec![Arc::new(slow), Arc::new(primary), Arc::new(secondary)],
        config(),
    );
    let report = agg.refresh(EventFilter::sport(Sport::Football)).await.unwrap();

    assert_eq!(
        report.outcome_for("a"),
        Some(AdapterOutcome::Failed {
            kind: FetchErrorKind::Timeout
        })
    );
    assert_eq!(
        report.outcome_for("c"),
        Some(AdapterOutcome::Succeeded { raw: 2, dropped: 0 })
    );
    assert_eq!(report.authentic, 5);
    assert_eq!(report.synthetic, 0);
    assert!(!report.synthesized);

    let events = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.provenance.adapter_id == "b"));
    assert!(events.iter().all(|e| !e.synthetic));
}

#[tokio::test(start_paused = true)]
async fn test_lower_tier_fills_missing_odds() {
    let mut no_odds = raw("1", "soccer", "Arsenal", "Chelsea", false);
    no_odds.odds = None;
    let mut priced = raw("p1", "soccer", "arsenal", "CHELSEA", false);
    priced.odds = Some(RawOdds {
        home: 1.9,
        away: 4.2,
        draw: Some(3.4),
    });

    let agg = aggregator(
        vec![
            Arc::new(MockAdapter::records("scores", 1, vec![no_odds])),
            Arc::new(MockAdapter::records("prices", 3, vec![priced])),
        ],
        AggregatorConfig {
            min_events_single: 1,
            ..config()
        },
    );

    let events = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.provenance.adapter_id, "scores");
    assert_eq!(event.home, "Arsenal");
    assert_eq!(event.away, "Chelsea");
    let odds = event.odds.unwrap();
    assert_eq!(odds.home, 1.9);
    assert_eq!(odds.draw, Some(3.4));
}

#[tokio::test(start_paused = true)]
async fn test_result_independent_of_completion_order() {
    let run = |fast_first: bool| async move {
        let (a_delay, b_delay) = if fast_first {
            (Duration::ZERO, Duration::from_secs(3))
        } else {
            (Duration::from_secs(3), Duration::ZERO)
        };
        let mut league_rows = football_fixtures();
        for row in &mut league_rows {
            row.league = "Premier League".to_string();
        }

        let agg = aggregator(
            vec![
                Arc::new(MockAdapter::records("a", 1, football_fixtures()).with_delay(a_delay)),
                Arc::new(MockAdapter::records("b", 2, league_rows).with_delay(b_delay)),
            ],
            config(),
        );
        agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap()
    };

    let first = run(true).await;
    let second = run(false).await;
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
    assert!(first.iter().all(|e| e.league == "Premier League"));
}

#[tokio::test(start_paused = true)]
async fn test_prices_at_one_clamped() {
    let mut row = raw("1", "basketball", "Boston Celtics", "Miami Heat", false);
    row.odds = Some(RawOdds {
        home: 1.00,
        away: 9.5,
        draw: Some(12.0),
    });

    let agg = aggregator(
        vec![Arc::new(MockAdapter::records("a", 1, vec![row]))],
        AggregatorConfig {
            min_events_single: 1,
            ..config()
        },
    );
    let events = agg.get_events(EventFilter::sport(Sport::Basketball)).await.unwrap();

    let odds = events[0].odds.unwrap();
    assert_eq!(odds.home, 1.01);
    assert_eq!(odds.away, 9.5);
    // No draw market in basketball
    assert_eq!(odds.draw, None);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_records_counted_as_dropped() {
    let rows = vec![
        raw("1", "soccer", "Arsenal", "Chelsea", false),
        raw("2", "soccer", "  ", "Chelsea", false),
        raw("3", "soccer", "Fulham", "FULHAM", false),
    ];
    let agg = aggregator(vec![Arc::new(MockAdapter::records("a", 1, rows))], config());

    let report = agg.refresh(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(
        report.outcome_for("a"),
        Some(AdapterOutcome::Succeeded { raw: 3, dropped: 2 })
    );
    assert_eq!(report.authentic, 1);
}

// ============================================================================
// TEST: QUALITY GATE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_total_failure_pads_with_synthetic() {
    let agg = aggregator(
        vec![
            Arc::new(MockAdapter::new(
                "a",
                1,
                Behavior::Fail(FetchError::Unauthorized("bad key".to_string())),
            )),
            Arc::new(MockAdapter::new(
                "b",
                2,
                Behavior::Fail(FetchError::RateLimited("slow down".to_string())),
            )),
        ],
        config(),
    );

    let report = agg.refresh(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(report.succeeded(), 0);
    assert!(report.synthesized);
    assert_eq!(report.authentic, 0);
    assert_eq!(report.synthetic, 5);

    let events = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(events.len(), 5);
    for event in &events {
        assert!(event.synthetic);
        assert_eq!(event.sport, Sport::Football);
        assert_eq!(event.provenance.adapter_id, "synthetic");
    }
}

#[tokio::test(start_paused = true)]
async fn test_thin_result_padded_per_sport() {
    let rows = vec![
        raw("1", "soccer", "Arsenal", "Chelsea", false),
        raw("2", "basketball", "Boston Celtics", "Miami Heat", false),
    ];
    let agg = aggregator(vec![Arc::new(MockAdapter::records("a", 1, rows))], config());

    let events = agg.get_events(EventFilter::all()).await.unwrap();
    let authentic: Vec<_> = events.iter().filter(|e| !e.synthetic).collect();
    assert_eq!(authentic.len(), 2);

    // Each synthetic sport is topped up to the target of 5
    for sport in [Sport::Football, Sport::Basketball] {
        assert_eq!(events.iter().filter(|e| e.sport == sport).count(), 5);
    }
}

#[tokio::test(start_paused = true)]
async fn test_live_request_only_returns_live_events() {
    let agg = aggregator(
        vec![Arc::new(MockAdapter::records("a", 1, football_fixtures()))],
        config(),
    );

    let events = agg
        .get_events(EventFilter::sport(Sport::Football).with_live(true))
        .await
        .unwrap();

    // Two authentic live fixtures, padded to the target
    assert_eq!(events.iter().filter(|e| !e.synthetic).count(), 2);
    assert_eq!(events.len(), 5);
    for event in &events {
        assert!(event.live);
        assert!(event.status.is_in_progress());
        assert!(event.has_consistent_status());
    }
}

// ============================================================================
// TEST: FAULT ISOLATION
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_panicking_adapter_isolated() {
    let agg = aggregator(
        vec![
            Arc::new(MockAdapter::new("boom", 1, Behavior::Panic)),
            Arc::new(MockAdapter::records("b", 2, football_fixtures())),
        ],
        config(),
    );

    let report = agg.refresh(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(report.outcome_for("boom"), Some(AdapterOutcome::Panicked));
    assert_eq!(report.authentic, 5);
}

/// Scenario:
/// - The only real adapter fails, so every sport needs padding
/// - The generator takes 3.9s per sport, under the adapter timeout
/// - Four sports in sequence would run to ~15.6s against an 8s deadline
#[tokio::test(start_paused = true)]
async fn test_slow_synthesizer_bounded_by_cycle_deadline() {
    let config = AggregatorConfig {
        synthetic_sports: vec![
            Sport::Football,
            Sport::Basketball,
            Sport::IceHockey,
            Sport::Tennis,
        ],
        ..AggregatorConfig::default()
    };
    let synth = MockAdapter::records("synthetic", 9, football_fixtures())
        .with_delay(Duration::from_millis(3_900))
        .as_synthetic();
    let synth_calls = synth.calls.clone();

    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(MockAdapter::new(
        "a",
        1,
        Behavior::Fail(FetchError::Unreachable("down".to_string())),
    )));
    let agg = EventAggregator::with_synthesizer(registry, Arc::new(synth), config.clone()).unwrap();

    let report = agg.refresh(EventFilter::all()).await.unwrap();
    assert!(report.synthesized);
    assert!(report.elapsed <= config.cycle_deadline);

    // Football filled before the deadline, the third call cut short, no fourth
    assert_eq!(report.synthetic, 5);
    assert_eq!(synth_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cycle_deadline_abandons_stuck_adapter() {
    let config = AggregatorConfig {
        adapter_timeout: Duration::from_millis(50),
        cycle_deadline: Duration::from_millis(100),
        ..config()
    };
    let agg = aggregator(
        vec![
            Arc::new(MockAdapter::new("stuck", 1, Behavior::Block(Duration::from_millis(400)))),
            Arc::new(MockAdapter::records("b", 2, football_fixtures())),
        ],
        config,
    );

    let report = agg.refresh(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(report.outcome_for("stuck"), Some(AdapterOutcome::Abandoned));
}

// ============================================================================
// TEST: CACHE AND SINGLE-FLIGHT
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_repeat_request_served_from_cache() {
    let adapter = MockAdapter::records("a", 1, football_fixtures());
    let calls = Arc::clone(&adapter.calls);
    let agg = aggregator(vec![Arc::new(adapter)], config());

    let first = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    let second = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Expired after the live TTL
    tokio::time::advance(Duration::from_secs(21)).await;
    agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_share_one_cycle() {
    let adapter = MockAdapter::records("a", 1, football_fixtures()).with_delay(Duration::from_secs(1));
    let calls = Arc::clone(&adapter.calls);
    let agg = aggregator(vec![Arc::new(adapter)], config());

    let results = join_all((0..5).map(|_| agg.get_events(EventFilter::sport(Sport::Football)))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let first = results[0].as_ref().unwrap();
    assert!(results.iter().all(|r| r.as_ref().unwrap() == first));
}

#[tokio::test(start_paused = true)]
async fn test_last_known_good_beats_synthetic() {
    let adapter = MockAdapter::records("a", 1, football_fixtures());
    let failing = Arc::clone(&adapter.failing);
    let agg = aggregator(vec![Arc::new(adapter)], config());

    let fresh = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert!(fresh.iter().all(|e| !e.synthetic));

    failing.store(true, Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(30)).await;

    let stale = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(stale, fresh);

    // Past the grace period only synthetic events remain
    tokio::time::advance(Duration::from_secs(700)).await;
    let padded = agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert!(padded.iter().all(|e| e.synthetic));
}

#[tokio::test(start_paused = true)]
async fn test_invalidation_drops_in_flight_result() {
    let adapter = MockAdapter::records("a", 1, football_fixtures()).with_delay(Duration::from_secs(2));
    let calls = Arc::clone(&adapter.calls);
    let agg = aggregator(vec![Arc::new(adapter)], config());

    let (events, _) = tokio::join!(
        agg.get_events(EventFilter::sport(Sport::Football)),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            agg.invalidate_cache();
        }
    );
    assert_eq!(events.unwrap().len(), 5);

    // The superseded cycle did not populate the cache
    agg.get_events(EventFilter::sport(Sport::Football)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// TEST: CONFIGURATION
// ============================================================================

#[test]
fn test_deadline_longer_than_ttl_rejected() {
    let config = AggregatorConfig {
        cycle_deadline: Duration::from_secs(30),
        ..AggregatorConfig::default()
    };
    let result = EventAggregator::new(AdapterRegistry::new(), config);
    assert!(matches!(result, Err(AggregationError::Misconfigured(_))));
}

#[test]
fn test_authentic_adapter_rejected_as_synthesizer() {
    let not_synthetic = Arc::new(MockAdapter::records("a", 1, Vec::new()));
    let result = EventAggregator::with_synthesizer(AdapterRegistry::new(), not_synthetic, config());
    assert!(matches!(result, Err(AggregationError::Misconfigured(_))));
}
