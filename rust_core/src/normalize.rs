//! Raw record → canonical event conversion.
//!
//! Every invariant of [`Event`] is enforced here, so nothing downstream has to
//! re-validate adapter output.

use crate::classifier::{classify_with_context, ClassifyContext};
use crate::error::NormalizeError;
use crate::models::{reconcile_status, Event, EventStatus, Odds, Provenance};
use crate::providers::RawEvent;
use crate::utils::text::normalize_participant;
use tracing::debug;

/// Identity of the adapter a raw record came from.
#[derive(Debug, Clone, Copy)]
pub struct SourceInfo<'a> {
    pub adapter_id: &'a str,
    pub tier: u8,
    pub synthetic: bool,
}

/// Turn one raw record into a canonical event.
///
/// Classifies the sport, reconciles the live flag with the status, drops
/// scores that cannot exist yet and validates odds.
pub fn normalize_record(raw: RawEvent, source: &SourceInfo<'_>) -> Result<Event, NormalizeError> {
    let home = raw.home.trim();
    let away = raw.away.trim();

    if home.is_empty() || away.is_empty() {
        return Err(NormalizeError::BlankParticipant(raw.source_id));
    }
    if normalize_participant(home) == normalize_participant(away) {
        return Err(NormalizeError::SameParticipants(raw.source_id));
    }

    let league = raw.league.trim();
    let classification = classify_with_context(
        &raw.sport,
        source.adapter_id,
        &ClassifyContext { league, home, away },
    );
    let sport = classification.sport;

    let (live, status) = reconcile_status(raw.live, raw.status);

    let score = match status {
        EventStatus::Scheduled | EventStatus::Postponed => None,
        _ => raw.score,
    };

    let odds = raw.odds.and_then(|o| {
        let normalized = Odds::normalize(o.home, o.away, o.draw, sport.allows_draw());
        if normalized.is_none() {
            debug!(
                "Dropping invalid odds {:?} on {}:{}",
                o, source.adapter_id, raw.source_id
            );
        }
        normalized
    });

    Ok(Event {
        id: format!("{}:{}", source.adapter_id, raw.source_id),
        sport,
        league: league.to_string(),
        home: home.to_string(),
        away: away.to_string(),
        start_time: raw.start_time,
        live,
        score,
        status,
        odds,
        provenance: Provenance::new(source.adapter_id, source.tier),
        synthetic: source.synthetic,
        confidence: classification.confidence,
        fetched_at: raw.fetched_at,
    })
}
