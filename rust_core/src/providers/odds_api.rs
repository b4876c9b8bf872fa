//! The Odds API Adapter
//!
//! Paid source of match-winner prices. All-sport requests use the
//! `upcoming` feed (live games plus the next fixtures across sports);
//! single-sport requests fetch the configured sport keys for that sport.

use super::{collect_records, FetchBatch, RawEvent, RawOdds, RecordOutcome, SourceAdapter, SportLabel};
use crate::classifier::classify;
use crate::clients::odds_api::{OddsApiClient, OddsApiEvent};
use crate::config::OddsApiConfig;
use crate::error::FetchError;
use crate::models::{EventFilter, EventStatus, Sport};
use crate::sport_config::PROVIDER_ODDS_API;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, warn};

pub const ODDS_API_TIER: u8 = 3;

/// Sport key covering the next fixtures of every sport.
const UPCOMING_KEY: &str = "upcoming";

pub struct OddsApiAdapter {
    client: OddsApiClient,
    /// Configured sport keys with their resolved sport
    sport_keys: Vec<(Sport, String)>,
}

impl OddsApiAdapter {
    /// Build the adapter; `None` when no API key is configured.
    pub fn from_config(config: &OddsApiConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?;
        Some(Self {
            client: OddsApiClient::new(&config.base_url, api_key, &config.regions),
            sport_keys: config
                .sport_keys
                .iter()
                .map(|key| {
                    let label = SportLabel::Name(sport_group(key).to_string());
                    (classify(&label, PROVIDER_ODDS_API).sport, key.clone())
                })
                .collect(),
        })
    }

    pub fn client(&self) -> &OddsApiClient {
        &self.client
    }

    fn keys_for(&self, filter: &EventFilter) -> Vec<String> {
        match filter.sport {
            None => vec![UPCOMING_KEY.to_string()],
            Some(sport) => self
                .sport_keys
                .iter()
                .filter(|(key_sport, _)| *key_sport == sport)
                .map(|(_, key)| key.clone())
                .collect(),
        }
    }
}

/// `soccer_epl` → `soccer`, `americanfootball_nfl` → `americanfootball`.
fn sport_group(sport_key: &str) -> &str {
    sport_key.split('_').next().unwrap_or(sport_key)
}

#[async_trait]
impl SourceAdapter for OddsApiAdapter {
    fn adapter_id(&self) -> &str {
        PROVIDER_ODDS_API
    }

    fn trust_tier(&self) -> u8 {
        ODDS_API_TIER
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<FetchBatch, FetchError> {
        let keys = self.keys_for(filter);
        if keys.is_empty() {
            debug!("The Odds API has no sport keys for {}", filter);
            return Ok(FetchBatch::default());
        }

        let results = join_all(keys.iter().map(|key| self.client.get_odds(key))).await;

        let fetched_at = Utc::now();
        let mut batch = FetchBatch::default();
        let mut last_error = None;
        let mut succeeded = 0;

        for (key, result) in keys.iter().zip(results) {
            match result {
                Ok(rows) => {
                    succeeded += 1;
                    let outcomes = rows.into_iter().map(|row| match row {
                        Ok(event) => event_to_raw(event, key, fetched_at),
                        Err(reason) => RecordOutcome::Dropped(reason),
                    });
                    batch.extend(collect_records(PROVIDER_ODDS_API, outcomes));
                }
                Err(e) => {
                    warn!("The Odds API {} failed: {}", key, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(batch),
        }
    }
}

/// Map one priced fixture onto a raw record. A fixture whose start has
/// passed is treated as in play.
fn event_to_raw(event: OddsApiEvent, requested_key: &str, fetched_at: DateTime<Utc>) -> RecordOutcome {
    let sport_key = if event.sport_key.is_empty() {
        requested_key
    } else {
        event.sport_key.as_str()
    };
    let sport = SportLabel::Name(sport_group(sport_key).to_string());

    let live = event.commence_time <= fetched_at;
    let status = if live {
        EventStatus::InProgress
    } else {
        EventStatus::Scheduled
    };

    let odds = match (event.home_price, event.away_price) {
        (Some(home), Some(away)) => Some(RawOdds {
            home,
            away,
            draw: event.draw_price,
        }),
        _ => None,
    };

    RecordOutcome::Parsed(RawEvent {
        source_id: event.id,
        sport,
        league: event.sport_title,
        home: event.home_team,
        away: event.away_team,
        start_time: event.commence_time,
        live,
        status,
        score: None,
        odds,
        fetched_at,
    })
}
