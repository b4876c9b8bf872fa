//! Aggregator and provider configuration.
//!
//! Every value has a typed default and can be overridden from the
//! environment (or a `.env` file loaded by the binary).

use crate::error::AggregationError;
use crate::models::{EventFilter, Sport};
use std::env;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ADAPTER_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_CYCLE_DEADLINE_MS: u64 = 8_000;
pub const DEFAULT_LIVE_TTL_SECS: u64 = 20;
pub const DEFAULT_UPCOMING_TTL_SECS: u64 = 120;
pub const DEFAULT_STALE_GRACE_SECS: u64 = 600;
pub const DEFAULT_MIN_EVENTS_ALL: usize = 10;
pub const DEFAULT_MIN_EVENTS_SINGLE: usize = 3;
pub const DEFAULT_SYNTHETIC_TARGET_PER_SPORT: usize = 5;
pub const DEFAULT_SYNTHETIC_SPORTS: &[Sport] = &[
    Sport::Football,
    Sport::Basketball,
    Sport::Tennis,
    Sport::IceHockey,
];

pub const DEFAULT_ESPN_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";
pub const DEFAULT_ESPN_LEAGUES: &[(&str, &str)] = &[
    ("soccer", "eng.1"),
    ("soccer", "esp.1"),
    ("basketball", "nba"),
    ("football", "nfl"),
    ("hockey", "nhl"),
    ("baseball", "mlb"),
];

pub const DEFAULT_SPORTSDB_BASE_URL: &str = "https://www.thesportsdb.com";
/// TheSportsDB's public test key
pub const DEFAULT_SPORTSDB_API_KEY: &str = "3";
pub const DEFAULT_SPORTSDB_SPORTS: &[&str] = &["Soccer", "Basketball", "Ice Hockey", "Tennis"];

pub const DEFAULT_ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com";
pub const DEFAULT_ODDS_API_REGIONS: &str = "eu";
pub const DEFAULT_ODDS_API_SPORT_KEYS: &[&str] = &[
    "soccer_epl",
    "soccer_spain_la_liga",
    "basketball_nba",
    "americanfootball_nfl",
    "icehockey_nhl",
    "baseball_mlb",
    "mma_mixed_martial_arts",
];

// ============================================================================
// Env helpers
// ============================================================================

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_csv(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let vals: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!vals.is_empty()).then_some(vals)
}

// ============================================================================
// Aggregator
// ============================================================================

/// Timing, caching and quality-gate settings for the aggregation path.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    /// Upper bound for a single adapter fetch
    pub adapter_timeout: Duration,
    /// Upper bound for a whole fan-out; adapters still running are abandoned
    pub cycle_deadline: Duration,
    /// TTL for live and all-status queries
    pub live_ttl: Duration,
    /// TTL for upcoming-only queries
    pub upcoming_ttl: Duration,
    /// How long authentic results are kept past expiry as last-known-good
    pub stale_grace: Duration,
    /// Minimum authentic events for an all-sport query
    pub min_events_all: usize,
    /// Minimum authentic events for a single-sport query
    pub min_events_single: usize,
    /// Events per sport the synthetic generator pads up to
    pub synthetic_target_per_sport: usize,
    /// Sports padded for all-sport queries
    pub synthetic_sports: Vec<Sport>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_millis(DEFAULT_ADAPTER_TIMEOUT_MS),
            cycle_deadline: Duration::from_millis(DEFAULT_CYCLE_DEADLINE_MS),
            live_ttl: Duration::from_secs(DEFAULT_LIVE_TTL_SECS),
            upcoming_ttl: Duration::from_secs(DEFAULT_UPCOMING_TTL_SECS),
            stale_grace: Duration::from_secs(DEFAULT_STALE_GRACE_SECS),
            min_events_all: DEFAULT_MIN_EVENTS_ALL,
            min_events_single: DEFAULT_MIN_EVENTS_SINGLE,
            synthetic_target_per_sport: DEFAULT_SYNTHETIC_TARGET_PER_SPORT,
            synthetic_sports: DEFAULT_SYNTHETIC_SPORTS.to_vec(),
        }
    }
}

impl AggregatorConfig {
    /// Load from `FEED_*` environment variables.
    ///
    /// Unknown sport ids in `FEED_SYNTHETIC_SPORTS` are a configuration
    /// error rather than being silently skipped.
    pub fn from_env() -> Result<Self, AggregationError> {
        let synthetic_sports = match env_csv("FEED_SYNTHETIC_SPORTS") {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    Sport::from_id(id).ok_or_else(|| {
                        AggregationError::Misconfigured(format!(
                            "FEED_SYNTHETIC_SPORTS: unknown sport '{}'",
                            id
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => DEFAULT_SYNTHETIC_SPORTS.to_vec(),
        };

        let config = Self {
            adapter_timeout: Duration::from_millis(env_or(
                "FEED_ADAPTER_TIMEOUT_MS",
                DEFAULT_ADAPTER_TIMEOUT_MS,
            )),
            cycle_deadline: Duration::from_millis(env_or(
                "FEED_CYCLE_DEADLINE_MS",
                DEFAULT_CYCLE_DEADLINE_MS,
            )),
            live_ttl: Duration::from_secs(env_or("FEED_LIVE_TTL_SECS", DEFAULT_LIVE_TTL_SECS)),
            upcoming_ttl: Duration::from_secs(env_or(
                "FEED_UPCOMING_TTL_SECS",
                DEFAULT_UPCOMING_TTL_SECS,
            )),
            stale_grace: Duration::from_secs(env_or(
                "FEED_STALE_GRACE_SECS",
                DEFAULT_STALE_GRACE_SECS,
            )),
            min_events_all: env_or("FEED_MIN_EVENTS_ALL", DEFAULT_MIN_EVENTS_ALL),
            min_events_single: env_or("FEED_MIN_EVENTS_SINGLE", DEFAULT_MIN_EVENTS_SINGLE),
            synthetic_target_per_sport: env_or(
                "FEED_SYNTHETIC_TARGET_PER_SPORT",
                DEFAULT_SYNTHETIC_TARGET_PER_SPORT,
            ),
            synthetic_sports,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the timing chain `adapter_timeout < cycle_deadline < live_ttl`
    /// and that synthesis can actually fill a response.
    pub fn validate(&self) -> Result<(), AggregationError> {
        let fail = |msg: String| Err(AggregationError::Misconfigured(msg));

        if self.adapter_timeout.is_zero() {
            return fail("adapter_timeout must be positive".to_string());
        }
        if self.adapter_timeout >= self.cycle_deadline {
            return fail(format!(
                "adapter_timeout ({:?}) must be shorter than cycle_deadline ({:?})",
                self.adapter_timeout, self.cycle_deadline
            ));
        }
        if self.cycle_deadline >= self.live_ttl {
            return fail(format!(
                "cycle_deadline ({:?}) must be shorter than live_ttl ({:?})",
                self.cycle_deadline, self.live_ttl
            ));
        }
        if self.upcoming_ttl.is_zero() {
            return fail("upcoming_ttl must be positive".to_string());
        }
        if self.synthetic_target_per_sport == 0 {
            return fail("synthetic_target_per_sport must be at least 1".to_string());
        }
        if self.synthetic_sports.is_empty() {
            return fail("synthetic_sports must name at least one sport".to_string());
        }
        Ok(())
    }

    /// Authentic events a result needs to skip synthesis.
    pub fn threshold_for(&self, filter: &EventFilter) -> usize {
        if filter.sport.is_some() {
            self.min_events_single
        } else {
            self.min_events_all
        }
    }

    /// Cache TTL for a request shape.
    pub fn ttl_for(&self, filter: &EventFilter) -> Duration {
        match filter.live {
            Some(false) => self.upcoming_ttl,
            _ => self.live_ttl,
        }
    }

    /// Sports the synthetic generator pads for this request.
    pub fn synthetic_sports_for(&self, filter: &EventFilter) -> Vec<Sport> {
        match filter.sport {
            Some(sport) => vec![sport],
            None => self.synthetic_sports.clone(),
        }
    }
}

// ============================================================================
// Providers
// ============================================================================

/// ESPN scoreboard settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EspnConfig {
    pub base_url: String,
    /// `(sport path, league path)` pairs, e.g. `("soccer", "eng.1")`
    pub leagues: Vec<(String, String)>,
}

impl Default for EspnConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ESPN_BASE_URL.to_string(),
            leagues: DEFAULT_ESPN_LEAGUES
                .iter()
                .map(|(s, l)| (s.to_string(), l.to_string()))
                .collect(),
        }
    }
}

impl EspnConfig {
    /// `ESPN_LEAGUES` is a comma-separated list of `sport/league` paths.
    pub fn from_env() -> Self {
        let leagues = env_csv("ESPN_LEAGUES")
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let (sport, league) = entry.split_once('/')?;
                        Some((sport.trim().to_string(), league.trim().to_string()))
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|leagues| !leagues.is_empty())
            .unwrap_or_else(|| Self::default().leagues);

        Self {
            base_url: env_string("ESPN_BASE_URL", DEFAULT_ESPN_BASE_URL),
            leagues,
        }
    }
}

/// TheSportsDB settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SportsDbConfig {
    pub base_url: String,
    pub api_key: String,
    /// Provider sport names fetched for all-sport queries
    pub sports: Vec<String>,
}

impl Default for SportsDbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SPORTSDB_BASE_URL.to_string(),
            api_key: DEFAULT_SPORTSDB_API_KEY.to_string(),
            sports: DEFAULT_SPORTSDB_SPORTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SportsDbConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("SPORTSDB_BASE_URL", DEFAULT_SPORTSDB_BASE_URL),
            api_key: env_string("SPORTSDB_API_KEY", DEFAULT_SPORTSDB_API_KEY),
            sports: env_csv("SPORTSDB_SPORTS").unwrap_or_else(|| Self::default().sports),
        }
    }
}

/// The Odds API settings. The adapter is only registered with a key.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub regions: String,
    /// Sport keys fetched for single-sport queries
    pub sport_keys: Vec<String>,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ODDS_API_BASE_URL.to_string(),
            api_key: None,
            regions: DEFAULT_ODDS_API_REGIONS.to_string(),
            sport_keys: DEFAULT_ODDS_API_SPORT_KEYS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl OddsApiConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("ODDS_API_BASE_URL", DEFAULT_ODDS_API_BASE_URL),
            api_key: env::var("ODDS_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            regions: env_string("ODDS_API_REGIONS", DEFAULT_ODDS_API_REGIONS),
            sport_keys: env_csv("ODDS_API_SPORTS").unwrap_or_else(|| Self::default().sport_keys),
        }
    }
}

/// Settings for every built-in adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub espn: EspnConfig,
    pub sportsdb: SportsDbConfig,
    pub odds_api: OddsApiConfig,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            espn: EspnConfig::from_env(),
            sportsdb: SportsDbConfig::from_env(),
            odds_api: OddsApiConfig::from_env(),
        }
    }
}
