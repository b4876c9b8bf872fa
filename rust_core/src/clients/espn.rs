use crate::clients::http::{build_client, send_json};
use crate::error::FetchError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for ESPN's public scoreboard JSON.
#[derive(Debug, Clone)]
pub struct EspnClient {
    client: Client,
    base_url: String,
}

/// One scoreboard entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub date: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// `status.type.name`, e.g. `STATUS_IN_PROGRESS`
    pub status: String,
    /// `status.type.state`: `pre`, `in` or `post`
    pub state: String,
    // Moneylines in American format
    pub home_moneyline: Option<f64>,
    pub away_moneyline: Option<f64>,
    pub draw_moneyline: Option<f64>,
}

impl Game {
    pub fn is_live(&self) -> bool {
        self.state == "in"
    }
}

impl EspnClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one league's scoreboard.
    ///
    /// The outer error means the scoreboard itself was unusable; each inner
    /// entry is one event, parsed or rejected with a reason.
    pub async fn get_scoreboard(
        &self,
        sport: &str,
        league: &str,
    ) -> Result<Vec<Result<Game, String>>, FetchError> {
        let url = format!("{}/{}/{}/scoreboard", self.base_url, sport, league);
        let context = format!("espn {}/{}", sport, league);
        let (_, data) = send_json(self.client.get(&url), &context).await?;
        parse_scoreboard(&data)
    }
}

/// Parse a scoreboard document.
pub fn parse_scoreboard(data: &serde_json::Value) -> Result<Vec<Result<Game, String>>, FetchError> {
    let events = data["events"]
        .as_array()
        .ok_or_else(|| FetchError::MalformedResponse("scoreboard has no events array".to_string()))?;

    let league = data["leagues"][0]["name"]
        .as_str()
        .or_else(|| data["leagues"][0]["abbreviation"].as_str())
        .unwrap_or_default();

    Ok(events.iter().map(|event| parse_event(event, league)).collect())
}

fn parse_event(event: &serde_json::Value, league: &str) -> Result<Game, String> {
    let id = match &event["id"] {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return Err("event without id".to_string()),
    };
    let date = event["date"]
        .as_str()
        .ok_or_else(|| format!("event {} has no date", id))?
        .to_string();
    let name = event["name"].as_str().unwrap_or_default().to_string();

    let competition = &event["competitions"][0];
    let competitors = competition["competitors"]
        .as_array()
        .ok_or_else(|| format!("event {} has no competitors", id))?;

    let mut home_team = None;
    let mut away_team = None;
    let mut home_score = None;
    let mut away_score = None;

    for comp in competitors {
        let team = &comp["team"];
        let team_name = team["displayName"]
            .as_str()
            .or_else(|| team["name"].as_str())
            .or_else(|| comp["athlete"]["displayName"].as_str())
            .map(str::to_string);
        let score = parse_score(&comp["score"]);

        if comp["homeAway"].as_str() == Some("home") {
            home_team = team_name;
            home_score = score;
        } else {
            away_team = team_name;
            away_score = score;
        }
    }

    let home_team = home_team.ok_or_else(|| format!("event {} has no home team", id))?;
    let away_team = away_team.ok_or_else(|| format!("event {} has no away team", id))?;

    let status_type = &event["status"]["type"];
    let status = status_type["name"]
        .as_str()
        .unwrap_or("STATUS_SCHEDULED")
        .to_string();
    let state = status_type["state"].as_str().unwrap_or("pre").to_string();

    let odds = &competition["odds"][0];
    let home_moneyline = parse_moneyline(&odds["homeTeamOdds"]["moneyLine"]);
    let away_moneyline = parse_moneyline(&odds["awayTeamOdds"]["moneyLine"]);
    let draw_moneyline = parse_moneyline(&odds["drawOdds"]["moneyLine"]);

    Ok(Game {
        id,
        name,
        date,
        league: league.to_string(),
        home_team,
        away_team,
        home_score,
        away_score,
        status,
        state,
        home_moneyline,
        away_moneyline,
        draw_moneyline,
    })
}

/// Scores arrive as strings ("3"), numbers, or not at all.
fn parse_score(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

fn parse_moneyline(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_start_matches('+').parse::<f64>().ok(),
        _ => None,
    }
}
