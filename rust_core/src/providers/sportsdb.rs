//! TheSportsDB Adapter
//!
//! Upcoming fixtures come from the v1 day listing (today and tomorrow), games
//! in play from the v2 livescore feed. When both list the same event the
//! livescore row wins.

use super::{collect_records, FetchBatch, RawEvent, RecordOutcome, SourceAdapter, SportLabel};
use crate::clients::sportsdb::{SportsDbClient, SportsDbEvent};
use crate::config::SportsDbConfig;
use crate::error::FetchError;
use crate::models::{EventFilter, EventStatus};
use crate::sport_config::{provider_label, PROVIDER_SPORTSDB};
use crate::utils::time::{parse_date_and_time, parse_provider_datetime};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

pub const SPORTSDB_TIER: u8 = 2;

type EventRows = Vec<Result<SportsDbEvent, String>>;

/// One request the adapter issues for a fetch.
#[derive(Debug, Clone, PartialEq)]
enum Request {
    Live { sport: String },
    Day { sport: String, date: NaiveDate },
}

impl Request {
    fn is_live(&self) -> bool {
        matches!(self, Request::Live { .. })
    }

    fn sport(&self) -> &str {
        match self {
            Request::Live { sport } | Request::Day { sport, .. } => sport,
        }
    }
}

pub struct SportsDbAdapter {
    client: SportsDbClient,
    sports: Vec<String>,
}

impl SportsDbAdapter {
    pub fn new(config: &SportsDbConfig) -> Self {
        Self {
            client: SportsDbClient::new(&config.base_url, &config.api_key),
            sports: config.sports.clone(),
        }
    }

    /// Requests needed for a filter, livescores first.
    fn plan(&self, filter: &EventFilter, today: NaiveDate) -> Vec<Request> {
        let sports: Vec<String> = match filter.sport {
            Some(sport) => provider_label(sport, PROVIDER_SPORTSDB)
                .map(|label| vec![label.to_string()])
                .unwrap_or_default(),
            None => self.sports.clone(),
        };

        let mut requests = Vec::new();
        if filter.live != Some(false) {
            requests.extend(sports.iter().map(|sport| Request::Live { sport: sport.clone() }));
        }
        if filter.live != Some(true) {
            for date in [today, today + Duration::days(1)] {
                requests.extend(sports.iter().map(|sport| Request::Day {
                    sport: sport.clone(),
                    date,
                }));
            }
        }
        requests
    }

    fn send(&self, request: &Request) -> BoxFuture<'_, Result<EventRows, FetchError>> {
        match request.clone() {
            Request::Live { sport } => async move { self.client.livescores(&sport).await }.boxed(),
            Request::Day { sport, date } => {
                async move { self.client.events_on_day(date, &sport).await }.boxed()
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for SportsDbAdapter {
    fn adapter_id(&self) -> &str {
        PROVIDER_SPORTSDB
    }

    fn trust_tier(&self) -> u8 {
        SPORTSDB_TIER
    }

    async fn fetch(&self, filter: &EventFilter) -> Result<FetchBatch, FetchError> {
        let requests = self.plan(filter, Utc::now().date_naive());
        if requests.is_empty() {
            debug!("TheSportsDB has no sport label for {}", filter);
            return Ok(FetchBatch::default());
        }

        let results = join_all(requests.iter().map(|r| self.send(r))).await;

        let fetched_at = Utc::now();
        let mut batch = FetchBatch::default();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut last_error = None;
        let mut succeeded = 0;

        for (request, result) in requests.iter().zip(results) {
            let rows = match result {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("TheSportsDB request {:?} failed: {}", request, e);
                    last_error = Some(e);
                    continue;
                }
            };
            succeeded += 1;

            let outcomes: Vec<RecordOutcome> = rows
                .into_iter()
                .filter_map(|row| match row {
                    Ok(event) => {
                        if !seen.insert(event.id.clone()) {
                            return None;
                        }
                        Some(event_to_raw(event, request.sport(), request.is_live(), fetched_at))
                    }
                    Err(reason) => Some(RecordOutcome::Dropped(reason)),
                })
                .collect();
            batch.extend(collect_records(PROVIDER_SPORTSDB, outcomes));
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(batch),
        }
    }
}

/// Map one TheSportsDB row onto a raw record.
///
/// The livescore feed also lists kick-offs that have not started and
/// matches that just ended, so its rows are only live when the status says
/// so or carries no status at all.
fn event_to_raw(
    event: SportsDbEvent,
    requested_sport: &str,
    from_livescore: bool,
    fetched_at: DateTime<Utc>,
) -> RecordOutcome {
    let start_time = event
        .timestamp
        .as_deref()
        .and_then(parse_provider_datetime)
        .or_else(|| {
            event
                .date
                .as_deref()
                .and_then(|d| parse_date_and_time(d, event.time.as_deref()))
        });
    let Some(start_time) = start_time else {
        return RecordOutcome::Dropped(format!("event {} has no usable start time", event.id));
    };

    let status = EventStatus::parse(&event.status);
    let live = status.is_in_progress() || (from_livescore && event.status.trim().is_empty());
    let sport = if event.sport.is_empty() {
        requested_sport.to_string()
    } else {
        event.sport
    };

    RecordOutcome::Parsed(RawEvent {
        source_id: event.id,
        sport: SportLabel::Name(sport),
        league: event.league,
        home: event.home_team,
        away: event.away_team,
        start_time,
        live,
        status,
        score: event.home_score.zip(event.away_score),
        odds: None,
        fetched_at,
    })
}
