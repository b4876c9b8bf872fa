// Canonical event model shared by every adapter and aggregation stage
use crate::sport_config::get_sport_config;
use crate::utils::text::normalize_participant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest decimal price an event may carry.
pub const MIN_DECIMAL_ODDS: f64 = 1.01;

/// Adapter id carried by every synthesized event.
pub const SYNTHETIC_ADAPTER_ID: &str = "synthetic";

/// Trust tier of synthesized events; loses to every authentic adapter.
pub const SYNTHETIC_TIER: u8 = u8::MAX;

// ============================================================================
// Sport & Status Enums
// ============================================================================

/// Canonical sport taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Football,
    Basketball,
    AmericanFootball,
    IceHockey,
    Baseball,
    Tennis,
    Mma,
    Cricket,
}

impl Sport {
    pub const ALL: [Sport; 8] = [
        Sport::Football,
        Sport::Basketball,
        Sport::AmericanFootball,
        Sport::IceHockey,
        Sport::Baseball,
        Sport::Tennis,
        Sport::Mma,
        Sport::Cricket,
    ];

    /// Canonical sport id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Basketball => "basketball",
            Sport::AmericanFootball => "american_football",
            Sport::IceHockey => "ice_hockey",
            Sport::Baseball => "baseball",
            Sport::Tennis => "tennis",
            Sport::Mma => "mma",
            Sport::Cricket => "cricket",
        }
    }

    /// Parse a canonical sport id (case-insensitive).
    pub fn from_id(id: &str) -> Option<Sport> {
        let id = id.trim();
        Sport::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(id))
    }

    /// Whether a draw price is meaningful for this sport.
    pub fn allows_draw(&self) -> bool {
        get_sport_config(*self).draw_eligible
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    InProgress,
    HalfTime,
    Finished,
    Postponed,
}

/// Short status codes used by scoreboard feeds for periods in play.
/// `P` is a shootout in progress; `PEN` is a match decided on penalties.
const IN_PLAY_CODES: &[&str] = &[
    "1h", "2h", "et", "bt", "p", "ot", "q1", "q2", "q3", "q4", "p1", "p2", "p3", "1q",
    "2q", "3q", "4q", "in1", "in2", "set1", "set2", "set3", "set4", "set5", "r1", "r2", "r3",
];

impl EventStatus {
    /// Whether the event is being played right now.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, EventStatus::InProgress | EventStatus::HalfTime)
    }

    /// Parse a provider's free-text status.
    ///
    /// Understands ESPN's `STATUS_*` names, TheSportsDB's short codes
    /// (`NS`, `1H`, `HT`, `FT`, ...) and plain English.
    pub fn parse(label: &str) -> EventStatus {
        let lower = label.trim().to_lowercase();

        if lower == "ht"
            || lower.contains("halftime")
            || lower.contains("half_time")
            || lower.contains("half time")
        {
            EventStatus::HalfTime
        } else if lower.contains("postponed")
            || lower.contains("cancelled")
            || lower.contains("canceled")
            || lower.contains("suspended")
            || lower.contains("abandoned")
            || lower.contains("interrupted")
            || lower == "pst"
            || lower == "canc"
            || lower == "susp"
            || lower == "abd"
            || lower == "int"
        {
            EventStatus::Postponed
        } else if lower == "ft"
            || lower == "aet"
            || lower == "ap"
            || lower == "pen"
            || lower == "awd"
            || lower == "wo"
            || lower.contains("final")
            || lower.contains("finished")
            || lower.contains("completed")
            || lower.contains("full_time")
            || lower.contains("full time")
            || lower.contains("ended")
        {
            EventStatus::Finished
        } else if lower.contains("in_progress")
            || lower.contains("in progress")
            || lower.contains("in play")
            || lower.contains("end_period")
            || lower.contains("first_half")
            || lower.contains("second_half")
            || lower.contains("overtime")
            || lower.contains("shootout")
            || lower.contains("live")
            || IN_PLAY_CODES.contains(&lower.as_str())
        {
            EventStatus::InProgress
        } else {
            EventStatus::Scheduled
        }
    }
}

/// Make the live flag and status agree.
///
/// An in-play status forces `live`, a finished or postponed one clears it,
/// and a live `Scheduled` record is promoted to `InProgress`.
pub fn reconcile_status(live: bool, status: EventStatus) -> (bool, EventStatus) {
    match status {
        EventStatus::InProgress | EventStatus::HalfTime => (true, status),
        EventStatus::Finished | EventStatus::Postponed => (false, status),
        EventStatus::Scheduled if live => (true, EventStatus::InProgress),
        EventStatus::Scheduled => (false, EventStatus::Scheduled),
    }
}

// ============================================================================
// Odds & Provenance
// ============================================================================

/// Decimal match-winner prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub home: f64,
    pub away: f64,
    pub draw: Option<f64>,
}

impl Odds {
    /// Validate raw prices.
    ///
    /// Home and away are required; if either is unusable the whole block is
    /// rejected. An unusable or ineligible draw price is dropped on its own.
    pub fn normalize(home: f64, away: f64, draw: Option<f64>, draw_allowed: bool) -> Option<Odds> {
        let home = normalize_price(home)?;
        let away = normalize_price(away)?;
        let draw = if draw_allowed {
            draw.and_then(normalize_price)
        } else {
            None
        };
        Some(Odds { home, away, draw })
    }

    pub fn is_valid(&self) -> bool {
        self.home >= MIN_DECIMAL_ODDS
            && self.away >= MIN_DECIMAL_ODDS
            && self.draw.map_or(true, |d| d >= MIN_DECIMAL_ODDS)
    }
}

/// Prices in [1.00, 1.01) are rounding artifacts and clamp up; anything
/// below 1.00 or non-finite is rejected.
fn normalize_price(price: f64) -> Option<f64> {
    if !price.is_finite() || price < 1.0 {
        return None;
    }
    Some(price.max(MIN_DECIMAL_ODDS))
}

/// Which adapter an event is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub adapter_id: String,
    pub tier: u8,
}

impl Provenance {
    pub fn new(adapter_id: &str, tier: u8) -> Self {
        Self {
            adapter_id: adapter_id.to_string(),
            tier,
        }
    }

    pub fn synthetic() -> Self {
        Self::new(SYNTHETIC_ADAPTER_ID, SYNTHETIC_TIER)
    }
}

/// How the sport of an event was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Fell back to the default sport
    Defaulted = 0,
    /// Keyword heuristics
    Heuristic = 1,
    /// Exact alias match
    Exact = 2,
}

impl Confidence {
    pub fn is_low(&self) -> bool {
        matches!(self, Confidence::Defaulted)
    }
}

// ============================================================================
// Event
// ============================================================================

/// Canonical sports event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub sport: Sport,
    pub league: String,
    pub home: String,
    pub away: String,
    pub start_time: DateTime<Utc>,
    pub live: bool,
    pub score: Option<(u32, u32)>,
    pub status: EventStatus,
    pub odds: Option<Odds>,
    pub provenance: Provenance,
    pub synthetic: bool,
    pub confidence: Confidence,
    pub fetched_at: DateTime<Utc>,
}

/// Dedup identity: normalized participants plus sport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub home: String,
    pub away: String,
    pub sport: Sport,
}

impl Event {
    pub fn key(&self) -> EventKey {
        EventKey {
            home: normalize_participant(&self.home),
            away: normalize_participant(&self.away),
            sport: self.sport,
        }
    }

    /// Whether the live flag and status agree.
    pub fn has_consistent_status(&self) -> bool {
        if self.live {
            self.status.is_in_progress()
        } else {
            !self.status.is_in_progress()
        }
    }
}

// ============================================================================
// Request filter
// ============================================================================

/// Request shape: optional sport and optional live/upcoming selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub sport: Option<Sport>,
    pub live: Option<bool>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn sport(sport: Sport) -> Self {
        Self {
            sport: Some(sport),
            live: None,
        }
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = Some(live);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.sport.map_or(true, |s| s == event.sport) && self.live.map_or(true, |l| l == event.live)
    }

    /// Parse `"<sport|all>:<live|upcoming|all>"`, e.g. `"football:live"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (sport, live) = raw.trim().split_once(':').unwrap_or((raw.trim(), "all"));
        let sport = match sport.trim() {
            "all" | "" => None,
            id => Some(Sport::from_id(id)?),
        };
        let live = match live.trim() {
            "all" | "" => None,
            "live" => Some(true),
            "upcoming" => Some(false),
            _ => return None,
        };
        Some(Self { sport, live })
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sport = self.sport.map_or("all", |s| s.as_str());
        let live = match self.live {
            Some(true) => "live",
            Some(false) => "upcoming",
            None => "all",
        };
        write!(f, "{}:{}", sport, live)
    }
}
