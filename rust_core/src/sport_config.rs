//! Sport taxonomy configuration.
//!
//! This module provides:
//! - Static configuration for every canonical sport
//! - Global and provider-specific aliases (names and numeric ids)
//! - Draw eligibility
//! - Statistical profiles for synthetic events

use crate::models::Sport;

/// Sport used when nothing else classifies a record.
pub const DEFAULT_SPORT: Sport = Sport::Football;

/// Provider ids used in alias tables.
pub const PROVIDER_ESPN: &str = "espn";
pub const PROVIDER_SPORTSDB: &str = "thesportsdb";
pub const PROVIDER_ODDS_API: &str = "the_odds_api";
pub const PROVIDER_BETFAIR: &str = "betfair";

/// A label one provider uses for a sport.
#[derive(Debug, Clone, Copy)]
pub struct ProviderAlias {
    pub provider: &'static str,
    pub label: &'static str,
}

const fn alias(provider: &'static str, label: &'static str) -> ProviderAlias {
    ProviderAlias { provider, label }
}

/// Ranges the synthetic generator draws from.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticProfile {
    /// Per-side score range while live; `None` for sports without a running score
    pub score_range: Option<(u32, u32)>,
    /// Decimal price range for the favourite
    pub favourite_odds: (f64, f64),
    /// Decimal price range for the underdog
    pub underdog_odds: (f64, f64),
    /// Draw price range (draw-eligible sports only)
    pub draw_odds: Option<(f64, f64)>,
    /// Whether live events can be at a half-time break
    pub has_half_time: bool,
    pub leagues: &'static [&'static str],
    pub participants: &'static [&'static str],
}

/// Configuration for a single canonical sport.
#[derive(Debug, Clone, Copy)]
pub struct SportConfig {
    pub sport: Sport,
    /// Display name
    pub name: &'static str,
    /// Labels recognized from any provider
    pub aliases: &'static [&'static str],
    /// Labels recognized only from a specific provider; checked first
    pub provider_aliases: &'static [ProviderAlias],
    /// Whether a draw outcome is priced
    pub draw_eligible: bool,
    pub synthetic: SyntheticProfile,
}

/// Static configuration for all canonical sports.
pub static SPORT_CONFIGS: &[SportConfig] = &[
    SportConfig {
        sport: Sport::Football,
        name: "Football",
        aliases: &["football", "soccer", "association football", "futbol", "calcio"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "soccer"),
            alias(PROVIDER_SPORTSDB, "Soccer"),
            alias(PROVIDER_ODDS_API, "soccer"),
            alias(PROVIDER_BETFAIR, "1"),
        ],
        draw_eligible: true,
        synthetic: SyntheticProfile {
            score_range: Some((0, 4)),
            favourite_odds: (1.45, 2.20),
            underdog_odds: (2.80, 6.50),
            draw_odds: Some((3.00, 4.20)),
            has_half_time: true,
            leagues: &["Premier League", "La Liga", "Serie A", "Bundesliga"],
            participants: &[
                "Arsenal",
                "Chelsea",
                "Liverpool",
                "Tottenham Hotspur",
                "Real Madrid",
                "Barcelona",
                "Atletico Madrid",
                "Juventus",
                "Inter",
                "AC Milan",
                "Bayern Munich",
                "Borussia Dortmund",
            ],
        },
    },
    SportConfig {
        sport: Sport::Basketball,
        name: "Basketball",
        aliases: &["basketball", "hoops"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "basketball"),
            alias(PROVIDER_SPORTSDB, "Basketball"),
            alias(PROVIDER_ODDS_API, "basketball"),
            alias(PROVIDER_BETFAIR, "7522"),
        ],
        draw_eligible: false,
        synthetic: SyntheticProfile {
            score_range: Some((40, 120)),
            favourite_odds: (1.25, 1.90),
            underdog_odds: (1.95, 4.50),
            draw_odds: None,
            has_half_time: true,
            leagues: &["NBA", "EuroLeague"],
            participants: &[
                "Los Angeles Lakers",
                "Boston Celtics",
                "Golden State Warriors",
                "Milwaukee Bucks",
                "Denver Nuggets",
                "Miami Heat",
                "Phoenix Suns",
                "New York Knicks",
            ],
        },
    },
    SportConfig {
        sport: Sport::AmericanFootball,
        name: "American Football",
        aliases: &["american football", "gridiron"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "football"),
            alias(PROVIDER_SPORTSDB, "American Football"),
            alias(PROVIDER_ODDS_API, "americanfootball"),
            alias(PROVIDER_BETFAIR, "6423"),
        ],
        draw_eligible: false,
        synthetic: SyntheticProfile {
            score_range: Some((0, 35)),
            favourite_odds: (1.30, 1.90),
            underdog_odds: (1.95, 4.00),
            draw_odds: None,
            has_half_time: true,
            leagues: &["NFL"],
            participants: &[
                "Kansas City Chiefs",
                "San Francisco 49ers",
                "Buffalo Bills",
                "Philadelphia Eagles",
                "Dallas Cowboys",
                "Baltimore Ravens",
            ],
        },
    },
    SportConfig {
        sport: Sport::IceHockey,
        name: "Ice Hockey",
        aliases: &["ice hockey", "icehockey", "hockey"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "hockey"),
            alias(PROVIDER_SPORTSDB, "Ice Hockey"),
            alias(PROVIDER_ODDS_API, "icehockey"),
            alias(PROVIDER_BETFAIR, "7524"),
        ],
        draw_eligible: false,
        synthetic: SyntheticProfile {
            score_range: Some((0, 5)),
            favourite_odds: (1.50, 2.00),
            underdog_odds: (1.90, 3.40),
            draw_odds: None,
            has_half_time: false,
            leagues: &["NHL"],
            participants: &[
                "Toronto Maple Leafs",
                "Boston Bruins",
                "Edmonton Oilers",
                "Colorado Avalanche",
                "New York Rangers",
                "Vegas Golden Knights",
            ],
        },
    },
    SportConfig {
        sport: Sport::Baseball,
        name: "Baseball",
        aliases: &["baseball"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "baseball"),
            alias(PROVIDER_SPORTSDB, "Baseball"),
            alias(PROVIDER_ODDS_API, "baseball"),
            alias(PROVIDER_BETFAIR, "7511"),
        ],
        draw_eligible: false,
        synthetic: SyntheticProfile {
            score_range: Some((0, 9)),
            favourite_odds: (1.50, 1.95),
            underdog_odds: (1.90, 3.00),
            draw_odds: None,
            has_half_time: false,
            leagues: &["MLB"],
            participants: &[
                "New York Yankees",
                "Los Angeles Dodgers",
                "Houston Astros",
                "Atlanta Braves",
                "Boston Red Sox",
                "Chicago Cubs",
            ],
        },
    },
    SportConfig {
        sport: Sport::Tennis,
        name: "Tennis",
        aliases: &["tennis"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "tennis"),
            alias(PROVIDER_SPORTSDB, "Tennis"),
            alias(PROVIDER_ODDS_API, "tennis"),
            alias(PROVIDER_BETFAIR, "2"),
        ],
        draw_eligible: false,
        synthetic: SyntheticProfile {
            score_range: Some((0, 2)),
            favourite_odds: (1.15, 1.85),
            underdog_odds: (1.95, 5.50),
            draw_odds: None,
            has_half_time: false,
            leagues: &["ATP Tour", "WTA Tour"],
            participants: &[
                "Novak Djokovic",
                "Carlos Alcaraz",
                "Jannik Sinner",
                "Daniil Medvedev",
                "Iga Swiatek",
                "Aryna Sabalenka",
                "Coco Gauff",
                "Elena Rybakina",
            ],
        },
    },
    SportConfig {
        sport: Sport::Mma,
        name: "MMA",
        aliases: &["mma", "mixed martial arts"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "mma"),
            alias(PROVIDER_SPORTSDB, "Fighting"),
            alias(PROVIDER_ODDS_API, "mma"),
            alias(PROVIDER_BETFAIR, "26420387"),
        ],
        draw_eligible: false,
        synthetic: SyntheticProfile {
            score_range: None,
            favourite_odds: (1.20, 1.80),
            underdog_odds: (2.00, 5.00),
            draw_odds: None,
            has_half_time: false,
            leagues: &["UFC"],
            participants: &[
                "Islam Makhachev",
                "Alex Pereira",
                "Jon Jones",
                "Leon Edwards",
                "Sean O'Malley",
                "Alexander Volkanovski",
            ],
        },
    },
    SportConfig {
        sport: Sport::Cricket,
        name: "Cricket",
        aliases: &["cricket"],
        provider_aliases: &[
            alias(PROVIDER_ESPN, "cricket"),
            alias(PROVIDER_SPORTSDB, "Cricket"),
            alias(PROVIDER_ODDS_API, "cricket"),
            alias(PROVIDER_BETFAIR, "4"),
        ],
        draw_eligible: true,
        synthetic: SyntheticProfile {
            score_range: Some((80, 300)),
            favourite_odds: (1.40, 1.90),
            underdog_odds: (2.00, 3.60),
            draw_odds: Some((4.00, 9.00)),
            has_half_time: false,
            leagues: &["Indian Premier League", "Test Series"],
            participants: &[
                "India",
                "Australia",
                "England",
                "South Africa",
                "New Zealand",
                "Pakistan",
            ],
        },
    },
];

/// Get the configuration for a sport.
pub fn get_sport_config(sport: Sport) -> &'static SportConfig {
    SPORT_CONFIGS
        .iter()
        .find(|c| c.sport == sport)
        .unwrap_or(&SPORT_CONFIGS[0])
}

/// Get all sport configurations.
pub fn get_all_sport_configs() -> &'static [SportConfig] {
    SPORT_CONFIGS
}

/// The label a provider uses for a sport, if the taxonomy knows one.
pub fn provider_label(sport: Sport, provider: &str) -> Option<&'static str> {
    get_sport_config(sport)
        .provider_aliases
        .iter()
        .find(|a| a.provider == provider)
        .map(|a| a.label)
}

// ============================================================================
// Tests
// ============================================================================
