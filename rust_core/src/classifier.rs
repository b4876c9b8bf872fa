//! Sport classification.
//!
//! Maps a provider's sport label (free text or numeric id) onto the canonical
//! taxonomy:
//! - exact alias lookup (provider-specific aliases first, then global ones)
//! - keyword heuristics over the label, league and participants
//! - fallback to the default sport with `Confidence::Defaulted`
//!
//! Classification is a pure function of its inputs.

use crate::models::{Confidence, Sport};
use crate::providers::SportLabel;
use crate::sport_config::{get_all_sport_configs, DEFAULT_SPORT, PROVIDER_BETFAIR};
use crate::utils::text::{contains_phrase, normalize};
use tracing::warn;

/// Result of classifying one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub sport: Sport,
    pub confidence: Confidence,
}

impl Classification {
    fn new(sport: Sport, confidence: Confidence) -> Self {
        Self { sport, confidence }
    }
}

/// Extra record fields the heuristics may look at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext<'a> {
    pub league: &'a str,
    pub home: &'a str,
    pub away: &'a str,
}

// ============================================================================
// Keyword tables
// ============================================================================

/// Sport words. Multi-word entries come first so "american football" never
/// falls through to "football".
const SPORT_KEYWORDS: &[(&str, Sport)] = &[
    ("american football", Sport::AmericanFootball),
    ("college football", Sport::AmericanFootball),
    ("ice hockey", Sport::IceHockey),
    ("mixed martial arts", Sport::Mma),
    ("basketball", Sport::Basketball),
    ("baseball", Sport::Baseball),
    ("hockey", Sport::IceHockey),
    ("tennis", Sport::Tennis),
    ("cricket", Sport::Cricket),
    ("mma", Sport::Mma),
    ("soccer", Sport::Football),
    ("futbol", Sport::Football),
    ("football", Sport::Football),
];

/// League and competition names. "indian premier league" must precede
/// "premier league".
const LEAGUE_KEYWORDS: &[(&str, Sport)] = &[
    ("indian premier league", Sport::Cricket),
    ("ipl", Sport::Cricket),
    ("big bash", Sport::Cricket),
    ("t20", Sport::Cricket),
    ("odi", Sport::Cricket),
    ("premier league", Sport::Football),
    ("champions league", Sport::Football),
    ("europa league", Sport::Football),
    ("la liga", Sport::Football),
    ("serie a", Sport::Football),
    ("bundesliga", Sport::Football),
    ("ligue 1", Sport::Football),
    ("eredivisie", Sport::Football),
    ("epl", Sport::Football),
    ("mls", Sport::Football),
    ("uefa", Sport::Football),
    ("fifa", Sport::Football),
    ("wnba", Sport::Basketball),
    ("nba", Sport::Basketball),
    ("euroleague", Sport::Basketball),
    ("ncaab", Sport::Basketball),
    ("march madness", Sport::Basketball),
    ("nfl", Sport::AmericanFootball),
    ("ncaaf", Sport::AmericanFootball),
    ("super bowl", Sport::AmericanFootball),
    ("nhl", Sport::IceHockey),
    ("khl", Sport::IceHockey),
    ("stanley cup", Sport::IceHockey),
    ("mlb", Sport::Baseball),
    ("world series", Sport::Baseball),
    ("atp", Sport::Tennis),
    ("wta", Sport::Tennis),
    ("wimbledon", Sport::Tennis),
    ("roland garros", Sport::Tennis),
    ("ufc", Sport::Mma),
    ("bellator", Sport::Mma),
    ("pfl", Sport::Mma),
];

/// Well-known participants whose names are unambiguous across sports.
const PARTICIPANT_KEYWORDS: &[(&str, Sport)] = &[
    ("lakers", Sport::Basketball),
    ("celtics", Sport::Basketball),
    ("warriors", Sport::Basketball),
    ("knicks", Sport::Basketball),
    ("76ers", Sport::Basketball),
    ("clippers", Sport::Basketball),
    ("bucks", Sport::Basketball),
    ("chiefs", Sport::AmericanFootball),
    ("eagles", Sport::AmericanFootball),
    ("cowboys", Sport::AmericanFootball),
    ("49ers", Sport::AmericanFootball),
    ("steelers", Sport::AmericanFootball),
    ("patriots", Sport::AmericanFootball),
    ("maple leafs", Sport::IceHockey),
    ("bruins", Sport::IceHockey),
    ("penguins", Sport::IceHockey),
    ("avalanche", Sport::IceHockey),
    ("oilers", Sport::IceHockey),
    ("red sox", Sport::Baseball),
    ("yankees", Sport::Baseball),
    ("dodgers", Sport::Baseball),
    ("cubs", Sport::Baseball),
    ("arsenal", Sport::Football),
    ("chelsea", Sport::Football),
    ("liverpool", Sport::Football),
    ("real madrid", Sport::Football),
    ("barcelona", Sport::Football),
    ("juventus", Sport::Football),
    ("bayern munich", Sport::Football),
];

// ============================================================================
// Classification
// ============================================================================

/// Classify a label using only the label itself.
pub fn classify(label: &SportLabel, provider_id: &str) -> Classification {
    classify_with_context(label, provider_id, &ClassifyContext::default())
}

/// Classify a label, letting the heuristics fall back to league and
/// participant names when the label alone is inconclusive.
pub fn classify_with_context(
    label: &SportLabel,
    provider_id: &str,
    context: &ClassifyContext<'_>,
) -> Classification {
    if let Some(sport) = lookup_alias(label, provider_id) {
        return Classification::new(sport, Confidence::Exact);
    }

    if let Some(sport) = match_keywords(label, context) {
        return Classification::new(sport, Confidence::Heuristic);
    }

    warn!(
        "Classification ambiguous for label {:?} from {} (league={:?}, {} vs {}); defaulting to {}",
        label, provider_id, context.league, context.home, context.away, DEFAULT_SPORT
    );
    Classification::new(DEFAULT_SPORT, Confidence::Defaulted)
}

fn lookup_alias(label: &SportLabel, provider_id: &str) -> Option<Sport> {
    let configs = get_all_sport_configs();

    match label {
        SportLabel::Id(id) => {
            let id = id.to_string();
            let for_provider = |provider: &str| {
                configs.iter().find_map(|c| {
                    c.provider_aliases
                        .iter()
                        .any(|a| a.provider.eq_ignore_ascii_case(provider) && a.label == id)
                        .then_some(c.sport)
                })
            };
            // Numeric ids from providers without their own table resolve
            // against the Betfair event type ids.
            for_provider(provider_id).or_else(|| for_provider(PROVIDER_BETFAIR))
        }
        SportLabel::Name(name) => {
            let name = normalize(name);
            if name.is_empty() {
                return None;
            }

            let provider_match = configs.iter().find_map(|c| {
                c.provider_aliases
                    .iter()
                    .any(|a| a.provider.eq_ignore_ascii_case(provider_id) && normalize(a.label) == name)
                    .then_some(c.sport)
            });
            if provider_match.is_some() {
                return provider_match;
            }

            configs.iter().find_map(|c| {
                let canonical = normalize(c.sport.as_str()) == name || normalize(c.name) == name;
                let alias = c.aliases.iter().any(|a| normalize(a) == name);
                (canonical || alias).then_some(c.sport)
            })
        }
    }
}

fn match_keywords(label: &SportLabel, context: &ClassifyContext<'_>) -> Option<Sport> {
    let label_text = match label {
        SportLabel::Name(name) => normalize(name),
        SportLabel::Id(_) => String::new(),
    };
    let league = normalize(context.league);
    let home = normalize(context.home);
    let away = normalize(context.away);

    let stages: [(&[(&str, Sport)], &str); 6] = [
        (SPORT_KEYWORDS, &label_text),
        (SPORT_KEYWORDS, &league),
        (LEAGUE_KEYWORDS, &label_text),
        (LEAGUE_KEYWORDS, &league),
        (PARTICIPANT_KEYWORDS, &home),
        (PARTICIPANT_KEYWORDS, &away),
    ];

    stages.iter().find_map(|(table, text)| {
        if text.is_empty() {
            return None;
        }
        table
            .iter()
            .find(|(keyword, _)| contains_phrase(text, keyword))
            .map(|(_, sport)| *sport)
    })
}

// ============================================================================
// Tests
// ============================================================================
