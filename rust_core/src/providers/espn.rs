//! ESPN Scoreboard Adapter
//!
//! Implements the SourceAdapter trait over ESPN's public scoreboard JSON.
//! Each configured `(sport, league)` path is fetched concurrently; the call
//! only fails if every league fails.

use super::{collect_records, FetchBatch, RawEvent, RawOdds, RecordOutcome, SourceAdapter, SportLabel};
use crate::classifier::classify;
use crate::clients::espn::{EspnClient, Game};
use crate::config::EspnConfig;
use crate::error::FetchError;
use crate::models::{EventFilter, EventStatus, Sport};
use crate::sport_config::PROVIDER_ESPN;
use crate::utils::odds::american_to_decimal;
use crate::utils::time::parse_provider_datetime;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, warn};

pub const ESPN_TIER: u8 = 1;

/// A configured scoreboard path with its sport resolved up front.
#[derive(Debug, Clone, PartialEq)]
struct League {
    sport: Sport,
    sport_path: String,
    league_path: String,
}

pub struct EspnAdapter {
    client: EspnClient,
    leagues: Vec<League>,
}

impl EspnAdapter {
    pub fn new(config: &EspnConfig) -> Self {
        let leagues = config
            .leagues
            .iter()
            .map(|(sport_path, league_path)| League {
                sport: classify(&SportLabel::Name(sport_path.clone()), PROVIDER_ESPN).sport,
                sport_path: sport_path.clone(),
                league_path: league_path.clone(),
            })
            .collect();

        Self {
            client: EspnClient::new(&config.base_url),
            leagues,
        }
    }

    /// League paths relevant to a filter.
    fn leagues_for(&self, filter: &EventFilter) -> Vec<&League> {
        self.leagues
            .iter()
            .filter(|league| filter.sport.map_or(true, |sport| league.sport == sport))
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for EspnAdapter {
    fn adapter_id(&self) -> &str {
        PROVIDER_ESPN
    }

    fn trust_tier(&self) -> u8 {
        ESPN_TIER
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<FetchBatch, FetchError> {
        let leagues = self.leagues_for(filter);
        if leagues.is_empty() {
            debug!("ESPN has no leagues configured for {}", filter);
            return Ok(FetchBatch::default());
        }

        let results = join_all(
            leagues
                .iter()
                .map(|l| self.client.get_scoreboard(&l.sport_path, &l.league_path)),
        )
        .await;

        let fetched_at = Utc::now();
        let mut batch = FetchBatch::default();
        let mut last_error = None;
        let mut succeeded = 0;

        for (league, result) in leagues.iter().zip(results) {
            match result {
                Ok(games) => {
                    succeeded += 1;
                    let outcomes = games.into_iter().map(|game| match game {
                        Ok(game) => {
                            game_to_raw(game, &league.sport_path, &league.league_path, fetched_at)
                        }
                        Err(reason) => RecordOutcome::Dropped(reason),
                    });
                    batch.extend(collect_records(PROVIDER_ESPN, outcomes));
                }
                Err(e) => {
                    warn!(
                        "ESPN scoreboard {}/{} failed: {}",
                        league.sport_path, league.league_path, e
                    );
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

/// Map one scoreboard game onto a raw record.
fn game_to_raw(game: Game, sport_path: &str, league_path: &str, fetched_at: DateTime<Utc>) -> RecordOutcome {
    let Some(start_time) = parse_provider_datetime(&game.date) else {
        return RecordOutcome::Dropped(format!("event {} has bad date '{}'", game.id, game.date));
    };

    let odds = match (
        game.home_moneyline.and_then(american_to_decimal),
        game.away_moneyline.and_then(american_to_decimal),
    ) {
        (Some(home), Some(away)) => Some(RawOdds {
            home,
            away,
            draw: game.draw_moneyline.and_then(american_to_decimal),
        }),
        _ => None,
    };

    let league = if game.league.is_empty() {
        league_path.to_string()
    } else {
        game.league
    };

    RecordOutcome::Parsed(RawEvent {
        live: game.state == "in",
        status: EventStatus::parse(&game.status),
        score: game.home_score.zip(game.away_score),
        source_id: game.id,
        sport: SportLabel::Name(sport_path.to_string()),
        league,
        home: game.home_team,
        away: game.away_team,
        start_time,
        odds,
        fetched_at,
    })
}
