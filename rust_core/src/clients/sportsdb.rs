//! TheSportsDB client.
//!
//! - v1 `eventsday.php` for a day's fixtures (key in the path)
//! - v2 `livescore/{sport}` for games in play (key in `X-API-KEY`)

use crate::clients::http::{build_client, send_json};
use crate::error::FetchError;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct SportsDbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// One TheSportsDB event row (v1 and v2 share most field names).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SportsDbEvent {
    pub id: String,
    pub sport: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// Short status code (`NS`, `1H`, `HT`, `FT`, ...) or free text
    pub status: String,
    /// ISO timestamp, when present
    pub timestamp: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl SportsDbClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fixtures for one sport on one day.
    pub async fn events_on_day(
        &self,
        date: NaiveDate,
        sport: &str,
    ) -> Result<Vec<Result<SportsDbEvent, String>>, FetchError> {
        let url = format!("{}/api/v1/json/{}/eventsday.php", self.base_url, self.api_key);
        let day = date.format("%Y-%m-%d").to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("d", day.as_str()), ("s", sport)]);
        let (_, data) = send_json(request, &format!("thesportsdb eventsday {}", sport)).await?;
        parse_event_list(&data, "events")
    }

    /// Games currently in play for one sport.
    pub async fn livescores(
        &self,
        sport: &str,
    ) -> Result<Vec<Result<SportsDbEvent, String>>, FetchError> {
        let url = format!(
            "{}/api/v2/json/livescore/{}",
            self.base_url,
            livescore_path(sport)
        );
        let request = self.client.get(&url).header("X-API-KEY", &self.api_key);
        let (_, data) = send_json(request, &format!("thesportsdb livescore {}", sport)).await?;
        parse_event_list(&data, "livescore")
    }
}

/// v2 livescore paths use lower-case, underscore-separated sport names.
fn livescore_path(sport: &str) -> String {
    sport.trim().to_lowercase().replace(' ', "_")
}

/// Parse `{ "<field>": [...] }`. A null or missing list means no events.
pub fn parse_event_list(
    data: &serde_json::Value,
    field: &str,
) -> Result<Vec<Result<SportsDbEvent, String>>, FetchError> {
    if !data.is_object() {
        return Err(FetchError::MalformedResponse(format!(
            "thesportsdb response is not an object (expected '{}')",
            field
        )));
    }

    match &data[field] {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(rows) => Ok(rows.iter().map(parse_event).collect()),
        _ => Err(FetchError::MalformedResponse(format!(
            "thesportsdb '{}' is not a list",
            field
        ))),
    }
}

fn parse_event(row: &serde_json::Value) -> Result<SportsDbEvent, String> {
    let id = text(&row["idEvent"]).ok_or_else(|| "event without idEvent".to_string())?;
    let home_team = text(&row["strHomeTeam"]).ok_or_else(|| format!("event {} has no home team", id))?;
    let away_team = text(&row["strAwayTeam"]).ok_or_else(|| format!("event {} has no away team", id))?;

    let timestamp = text(&row["strTimestamp"]);
    let date = text(&row["dateEvent"]);
    if timestamp.is_none() && date.is_none() {
        return Err(format!("event {} has no date", id));
    }

    Ok(SportsDbEvent {
        sport: text(&row["strSport"]).unwrap_or_default(),
        league: text(&row["strLeague"]).unwrap_or_default(),
        home_team,
        away_team,
        home_score: score(&row["intHomeScore"]),
        away_score: score(&row["intAwayScore"]),
        status: text(&row["strStatus"])
            .or_else(|| text(&row["strProgress"]))
            .unwrap_or_default(),
        timestamp,
        date,
        time: text(&row["strTime"]).or_else(|| text(&row["strEventTime"])),
        id,
    })
}

/// Non-empty string or number as text.
fn text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Scores are strings, numbers or null.
fn score(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}
