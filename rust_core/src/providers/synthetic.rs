//! Synthetic Event Generator
//!
//! Produces plausible fixtures when authentic sources come up short. Every
//! record is flagged synthetic and attributed to the synthetic adapter only.
//! Scores and prices are drawn from per-sport profiles in the taxonomy.

use super::{FetchBatch, RawEvent, RawOdds, SourceAdapter, SportLabel};
use crate::error::FetchError;
use crate::models::{EventFilter, EventStatus, Sport, SYNTHETIC_ADAPTER_ID, SYNTHETIC_TIER};
use crate::sport_config::{get_sport_config, SyntheticProfile};
use crate::utils::odds::round_price;
use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Share of events that are live when the request does not say.
const LIVE_SHARE: f64 = 0.4;

pub struct SyntheticGenerator {
    per_sport: usize,
    sports: Vec<Sport>,
    rng: Mutex<StdRng>,
}

impl SyntheticGenerator {
    /// Generator producing `per_sport` events for each requested sport;
    /// `sports` are used for all-sport requests.
    pub fn new(per_sport: usize, sports: Vec<Sport>) -> Self {
        Self {
            per_sport,
            sports,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests.
    pub fn with_seed(per_sport: usize, sports: Vec<Sport>, seed: u64) -> Self {
        Self {
            per_sport,
            sports,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate up to `count` events for one sport.
    ///
    /// Participants are paired without repetition, so no two generated
    /// fixtures share a dedup key. `live` forces every event live or
    /// upcoming; `None` mixes both.
    pub fn generate(&self, sport: Sport, live: Option<bool>, count: usize) -> Vec<RawEvent> {
        let profile = &get_sport_config(sport).synthetic;
        let now = Utc::now();
        let mut rng = self.rng.lock();

        let mut pairs: Vec<(&str, &str)> = profile
            .participants
            .iter()
            .enumerate()
            .flat_map(|(i, a)| profile.participants[i + 1..].iter().map(move |b| (*a, *b)))
            .collect();
        pairs.shuffle(&mut *rng);

        pairs
            .into_iter()
            .take(count)
            .map(|(a, b)| {
                let (home, away) = if rng.gen_bool(0.5) { (a, b) } else { (b, a) };
                let is_live = live.unwrap_or_else(|| rng.gen_bool(LIVE_SHARE));
                synthesize(&mut *rng, sport, profile, home, away, is_live, now)
            })
            .collect()
    }
}

fn synthesize(
    rng: &mut StdRng,
    sport: Sport,
    profile: &SyntheticProfile,
    home: &str,
    away: &str,
    live: bool,
    now: DateTime<Utc>,
) -> RawEvent {
    let league = profile
        .leagues
        .choose(rng)
        .copied()
        .unwrap_or_default()
        .to_string();

    let (start_time, status, score) = if live {
        let started = now - Duration::minutes(rng.gen_range(5..=100));
        let status = if profile.has_half_time && rng.gen_bool(0.15) {
            EventStatus::HalfTime
        } else {
            EventStatus::InProgress
        };
        let score = profile
            .score_range
            .map(|(lo, hi)| (rng.gen_range(lo..=hi), rng.gen_range(lo..=hi)));
        (started, status, score)
    } else {
        let start = now + Duration::minutes(rng.gen_range(30..=48 * 60));
        let start = start.duration_round(Duration::minutes(5)).unwrap_or(start);
        (start, EventStatus::Scheduled, None)
    };

    let favourite = round_price(rng.gen_range(profile.favourite_odds.0..=profile.favourite_odds.1));
    let underdog = round_price(rng.gen_range(profile.underdog_odds.0..=profile.underdog_odds.1));
    let (home_price, away_price) = if rng.gen_bool(0.5) {
        (favourite, underdog)
    } else {
        (underdog, favourite)
    };
    let draw = profile
        .draw_odds
        .map(|(lo, hi)| round_price(rng.gen_range(lo..=hi)));

    RawEvent {
        source_id: format!("{}:{}", sport.as_str(), Uuid::new_v4()),
        sport: SportLabel::Name(sport.as_str().to_string()),
        league,
        home: home.to_string(),
        away: away.to_string(),
        start_time,
        live,
        status,
        score,
        odds: Some(RawOdds {
            home: home_price,
            away: away_price,
            draw,
        }),
        fetched_at: now,
    }
}

#[async_trait]
impl SourceAdapter for SyntheticGenerator {
    fn adapter_id(&self) -> &str {
        SYNTHETIC_ADAPTER_ID
    }

    fn trust_tier(&self) -> u8 {
        SYNTHETIC_TIER
    }

    fn is_synthetic(&self) -> bool {
        true
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<FetchBatch, FetchError> {
        let sports = match filter.sport {
            Some(sport) => vec![sport],
            None => self.sports.clone(),
        };
        let records = sports
            .into_iter()
            .flat_map(|sport| self.generate(sport, filter.live, self.per_sport))
            .collect();
        Ok(FetchBatch::new(records))
    }
}
