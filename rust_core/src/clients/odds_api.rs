//! The Odds API client.
//!
//! Fetches head-to-head prices in decimal format and averages them across
//! bookmakers. Quota headers (`x-requests-remaining`, `x-requests-used`) are
//! read from every response and logged.

use crate::clients::http::{build_client, header_number, send_json};
use crate::error::FetchError;
use crate::utils::odds::average_price;
use crate::utils::time::parse_provider_datetime;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Remaining quota below which every fetch logs a warning.
const LOW_QUOTA_WARNING: u64 = 50;

#[derive(Debug, Clone, Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    sport_key: String,
    #[serde(default)]
    sport_title: String,
    commence_time: String,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<ApiBookmaker>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiBookmaker {
    #[serde(default)]
    markets: Vec<ApiMarket>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<ApiOutcome>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiOutcome {
    name: String,
    price: f64,
}

/// A fixture with bookmaker-averaged match-winner prices.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsApiEvent {
    pub id: String,
    pub sport_key: String,
    pub sport_title: String,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub home_price: Option<f64>,
    pub away_price: Option<f64>,
    pub draw_price: Option<f64>,
}

/// Quota reported by the last response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaInfo {
    pub remaining: Option<u64>,
    pub used: Option<u64>,
}

#[derive(Debug)]
pub struct OddsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    regions: String,
    quota: Mutex<QuotaInfo>,
}

impl OddsApiClient {
    pub fn new(base_url: &str, api_key: &str, regions: &str) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            regions: regions.to_string(),
            quota: Mutex::new(QuotaInfo::default()),
        }
    }

    /// Quota from the most recent response.
    pub fn quota(&self) -> QuotaInfo {
        *self.quota.lock()
    }

    /// h2h odds for one sport key (or `upcoming` for the next fixtures
    /// across all sports).
    pub async fn get_odds(
        &self,
        sport_key: &str,
    ) -> Result<Vec<Result<OddsApiEvent, String>>, FetchError> {
        let url = format!("{}/v4/sports/{}/odds", self.base_url, sport_key);
        let request = self.client.get(&url).query(&[
            ("apiKey", self.api_key.as_str()),
            ("regions", self.regions.as_str()),
            ("markets", "h2h"),
            ("oddsFormat", "decimal"),
            ("dateFormat", "iso"),
        ]);

        let (headers, data) = send_json(request, &format!("the odds api {}", sport_key)).await?;
        self.record_quota(&headers, sport_key);
        parse_odds(&data)
    }

    fn record_quota(&self, headers: &HeaderMap, sport_key: &str) {
        let quota = QuotaInfo {
            remaining: header_number(headers, "x-requests-remaining"),
            used: header_number(headers, "x-requests-used"),
        };
        *self.quota.lock() = quota;

        match quota.remaining {
            Some(remaining) if remaining < LOW_QUOTA_WARNING => warn!(
                "The Odds API quota low after {}: {} requests remaining",
                sport_key, remaining
            ),
            _ => debug!(
                "The Odds API quota after {}: remaining={:?} used={:?}",
                sport_key, quota.remaining, quota.used
            ),
        }
    }
}

/// Parse an odds response (a JSON list of fixtures).
pub fn parse_odds(data: &serde_json::Value) -> Result<Vec<Result<OddsApiEvent, String>>, FetchError> {
    let rows = data
        .as_array()
        .ok_or_else(|| FetchError::MalformedResponse("odds response is not a list".to_string()))?;
    Ok(rows.iter().map(parse_match).collect())
}

fn parse_match(row: &serde_json::Value) -> Result<OddsApiEvent, String> {
    let m: ApiMatch = serde_json::from_value(row.clone()).map_err(|e| e.to_string())?;
    let commence_time = parse_provider_datetime(&m.commence_time)
        .ok_or_else(|| format!("event {} has bad commence_time '{}'", m.id, m.commence_time))?;

    let mut home = Vec::new();
    let mut away = Vec::new();
    let mut draw = Vec::new();

    let h2h = m
        .bookmakers
        .iter()
        .flat_map(|b| b.markets.iter())
        .filter(|market| market.key == "h2h");
    for market in h2h {
        for outcome in &market.outcomes {
            if outcome.name == m.home_team {
                home.push(outcome.price);
            } else if outcome.name == m.away_team {
                away.push(outcome.price);
            } else if outcome.name.eq_ignore_ascii_case("draw") {
                draw.push(outcome.price);
            }
        }
    }

    Ok(OddsApiEvent {
        home_price: average_price(&home),
        away_price: average_price(&away),
        draw_price: average_price(&draw),
        id: m.id,
        sport_key: m.sport_key,
        sport_title: m.sport_title,
        commence_time,
        home_team: m.home_team,
        away_team: m.away_team,
    })
}
