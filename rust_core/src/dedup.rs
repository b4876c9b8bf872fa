//! Event deduplication.
//!
//! Events are grouped by [`EventKey`] (trimmed, lower-cased participants plus
//! sport) in a single hash pass. Each group collapses to its most trusted
//! record, with empty fields backfilled from the other contributors.

use crate::models::{Event, EventKey, EventStatus};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Precedence between two contributors to the same event.
///
/// Lower tier first, then most recent fetch, then adapter id and event id so
/// the order is total and independent of input order.
fn precedence(a: &Event, b: &Event) -> Ordering {
    a.provenance
        .tier
        .cmp(&b.provenance.tier)
        .then_with(|| b.fetched_at.cmp(&a.fetched_at))
        .then_with(|| a.provenance.adapter_id.cmp(&b.provenance.adapter_id))
        .then_with(|| a.id.cmp(&b.id))
}

/// Output order: live first, then start time, then id. Sport and
/// participants settle events that share a provider id.
fn output_order(a: &Event, b: &Event) -> Ordering {
    b.live
        .cmp(&a.live)
        .then_with(|| a.start_time.cmp(&b.start_time))
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.sport.cmp(&b.sport))
        .then_with(|| a.home.cmp(&b.home))
        .then_with(|| a.away.cmp(&b.away))
}

/// Collapse one group of contributors into a single event.
fn merge_group(mut donors: Vec<Event>) -> Event {
    donors.sort_by(precedence);
    let mut winner = donors.remove(0);

    // A score only makes sense once the winner's fixture has started.
    let takes_score = winner.status.is_in_progress() || winner.status == EventStatus::Finished;

    // Donors must share the winner's synthetic flag so generated data never
    // leaks into an authentic event.
    for donor in donors.into_iter().filter(|d| d.synthetic == winner.synthetic) {
        if winner.score.is_none() && takes_score {
            winner.score = donor.score;
        }
        if winner.odds.is_none() {
            winner.odds = donor.odds;
        }
        if winner.league.is_empty() && !donor.league.is_empty() {
            winner.league = donor.league;
        }
    }

    winner
}

/// Deduplicate events that describe the same fixture.
///
/// The output holds one event per key, ordered live first, then by start
/// time, then by id. Ids are unique in the output.
pub fn dedupe(events: Vec<Event>) -> Vec<Event> {
    let mut groups: FxHashMap<EventKey, Vec<Event>> = FxHashMap::default();
    for event in events {
        groups.entry(event.key()).or_default().push(event);
    }

    let mut merged: Vec<Event> = groups.into_values().map(merge_group).collect();
    merged.sort_by(output_order);

    // Distinct fixtures can still share a provider id (e.g. a provider
    // reusing ids across sports); suffix repeats in output order.
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for event in &mut merged {
        if !seen.insert(event.id.clone()) {
            let mut n = 2;
            let mut candidate = format!("{}#{}", event.id, n);
            while seen.contains(&candidate) {
                n += 1;
                candidate = format!("{}#{}", event.id, n);
            }
            seen.insert(candidate.clone());
            event.id = candidate;
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, EventStatus, Odds, Provenance, Sport};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn event(id: &str, adapter: &str, tier: u8, home: &str, away: &str) -> Event {
        Event {
            id: format!("{}:{}", adapter, id),
            sport: Sport::Football,
            league: String::new(),
            home: home.to_string(),
            away: away.to_string(),
            start_time: base_time(),
            live: false,
            score: None,
            status: EventStatus::Scheduled,
            odds: None,
            provenance: Provenance::new(adapter, tier),
            synthetic: false,
            confidence: Confidence::Exact,
            fetched_at: base_time(),
        }
    }

    #[test]
    fn test_merges_case_and_whitespace_variants() {
        let a = event("1", "espn", 1, "Arsenal", "Chelsea");
        let b = event("9", "thesportsdb", 2, " arsenal", "CHELSEA ");

        let out = dedupe(vec![b, a]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "espn:1");
        assert_eq!(out[0].provenance.adapter_id, "espn");
    }

    #[test]
    fn test_different_sports_not_merged() {
        let a = event("1", "espn", 1, "Rangers", "Celtic");
        let mut b = event("2", "espn", 1, "Rangers", "Celtic");
        b.sport = Sport::IceHockey;

        assert_eq!(dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_recency_breaks_tier_ties() {
        let older = event("1", "feed_a", 2, "Arsenal", "Chelsea");
        let mut newer = event("2", "feed_b", 2, "Arsenal", "Chelsea");
        newer.fetched_at = base_time() + Duration::seconds(30);

        let out = dedupe(vec![older, newer]);
        assert_eq!(out[0].id, "feed_b:2");
    }

    #[test]
    fn test_backfill_from_next_best() {
        let mut winner = event("1", "espn", 1, "Arsenal", "Chelsea");
        winner.live = true;
        winner.status = EventStatus::InProgress;

        let mut second = event("2", "thesportsdb", 2, "Arsenal", "Chelsea");
        second.league = "Premier League".to_string();
        second.score = Some((1, 1));
        second.live = true;
        second.status = EventStatus::InProgress;

        let mut third = event("3", "the_odds_api", 3, "Arsenal", "Chelsea");
        third.odds = Some(Odds {
            home: 2.1,
            away: 3.3,
            draw: Some(3.4),
        });
        third.league = "EPL".to_string();

        let out = dedupe(vec![third, second, winner]);
        assert_eq!(out.len(), 1);
        let merged = &out[0];
        assert_eq!(merged.id, "espn:1");
        assert_eq!(merged.league, "Premier League");
        assert_eq!(merged.score, Some((1, 1)));
        assert!(merged.odds.is_some());
        assert_eq!(merged.provenance.adapter_id, "espn");
    }

    #[test]
    fn test_no_score_backfill_before_kickoff() {
        let winner = event("1", "espn", 1, "Arsenal", "Chelsea");
        let mut donor = event("2", "thesportsdb", 2, "Arsenal", "Chelsea");
        donor.score = Some((2, 0));
        donor.status = EventStatus::Finished;

        let out = dedupe(vec![winner, donor]);
        assert_eq!(out[0].score, None);
    }

    #[test]
    fn test_synthetic_never_backfills_authentic() {
        let authentic = event("1", "espn", 1, "Arsenal", "Chelsea");
        let mut synthetic = event("x", "synthetic", u8::MAX, "Arsenal", "Chelsea");
        synthetic.synthetic = true;
        synthetic.odds = Some(Odds {
            home: 1.9,
            away: 4.0,
            draw: Some(3.5),
        });
        synthetic.league = "Premier League".to_string();

        let out = dedupe(vec![synthetic, authentic]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].synthetic);
        assert_eq!(out[0].odds, None);
        assert!(out[0].league.is_empty());
    }

    #[test]
    fn test_output_order_and_unique_keys() {
        let mut late = event("1", "espn", 1, "A", "B");
        late.start_time = base_time() + Duration::hours(3);
        let early = event("2", "espn", 1, "C", "D");
        let mut live = event("3", "espn", 1, "E", "F");
        live.live = true;
        live.status = EventStatus::InProgress;
        live.start_time = base_time() + Duration::hours(5);

        let out = dedupe(vec![late, early, live]);
        let ids: Vec<_> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["espn:3", "espn:2", "espn:1"]);

        let keys: FxHashSet<_> = out.iter().map(|e| e.key()).collect();
        assert_eq!(keys.len(), out.len());
    }

    #[test]
    fn test_duplicate_ids_get_suffix() {
        let a = event("7", "espn", 1, "A", "B");
        let mut b = event("7", "espn", 1, "A", "B");
        b.sport = Sport::Basketball;

        let out = dedupe(vec![a, b]);
        let ids: FxHashSet<_> = out.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("espn:7"));
        assert!(ids.contains("espn:7#2"));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = event("1", "espn", 1, "Arsenal", "Chelsea");
        let mut b = event("2", "thesportsdb", 2, "arsenal", "chelsea");
        b.league = "Premier League".to_string();
        let c = event("3", "espn", 1, "Lakers", "Celtics");

        let forward = dedupe(vec![a.clone(), b.clone(), c.clone()]);
        let backward = dedupe(vec![c, b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_output_keys_unique_for_generated_inputs() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        const TEAMS: [&str; 5] = ["Arsenal", "Chelsea", "Real Madrid", "Boston Celtics", "Miami Heat"];
        const ADAPTERS: [&str; 3] = ["espn", "thesportsdb", "the_odds_api"];

        fn variant(rng: &mut StdRng, name: &str) -> String {
            let name = match rng.gen_range(0..3) {
                0 => name.to_lowercase(),
                1 => name.to_uppercase(),
                _ => name.to_string(),
            };
            match rng.gen_range(0..3) {
                0 => format!("  {}", name),
                1 => format!("{} ", name),
                _ => name,
            }
        }

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let count = rng.gen_range(1..30);
            let mut events = Vec::with_capacity(count);
            for _ in 0..count {
                let home = rng.gen_range(0..TEAMS.len());
                let away = (home + rng.gen_range(1..TEAMS.len())) % TEAMS.len();
                let adapter = ADAPTERS[rng.gen_range(0..ADAPTERS.len())];
                let id = rng.gen_range(0..10).to_string();
                let home = variant(&mut rng, TEAMS[home]);
                let away = variant(&mut rng, TEAMS[away]);

                let mut e = event(&id, adapter, rng.gen_range(1..=3), &home, &away);
                if rng.gen_bool(0.5) {
                    e.sport = Sport::Basketball;
                }
                if rng.gen_bool(0.3) {
                    e.live = true;
                    e.status = EventStatus::InProgress;
                }
                events.push(e);
            }

            let input_keys: FxHashSet<EventKey> = events.iter().map(Event::key).collect();
            let out = dedupe(events);

            let output_keys: FxHashSet<EventKey> = out.iter().map(Event::key).collect();
            assert_eq!(output_keys.len(), out.len(), "duplicate key in output");
            assert_eq!(output_keys, input_keys);

            let ids: FxHashSet<&str> = out.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids.len(), out.len(), "duplicate id in output");
        }
    }
}
