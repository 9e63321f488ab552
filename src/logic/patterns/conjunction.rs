//! Conjunction Detector
//!
//! - Triple: three consecutive conjunctions of the same unordered pair within
//!   365 days. Every qualifying window is emitted.
//! - Grand: every Jupiter-Saturn conjunction, no count threshold.

use std::collections::BTreeMap;

use super::types::{ConjunctionKind, ConjunctionPattern};
use crate::logic::events::{Event, EventType};

pub const TRIPLE_COUNT: usize = 3;
pub const TRIPLE_MAX_SPAN_DAYS: i64 = 365;

pub const TRIPLE_SIGNIFICANCE: f64 = 0.8;
pub const GRAND_SIGNIFICANCE: f64 = 0.9;

const GRAND_PAIR: (&str, &str) = ("jupiter", "saturn");

pub fn detect_conjunctions(events: &[Event]) -> Vec<ConjunctionPattern> {
    let mut by_pair: BTreeMap<(String, String), Vec<&Event>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.event_type == EventType::Conjunction) {
        for pair in event.planet_pairs() {
            by_pair.entry(pair).or_default().push(event);
        }
    }

    let mut patterns = Vec::new();
    for ((a, b), mut occurrences) in by_pair {
        occurrences.sort_by(|x, y| x.timestamp.cmp(&y.timestamp).then_with(|| x.id.cmp(&y.id)));

        for window in occurrences.windows(TRIPLE_COUNT) {
            let span = (window[TRIPLE_COUNT - 1].timestamp.date_naive() - window[0].timestamp.date_naive()).num_days();
            if span <= TRIPLE_MAX_SPAN_DAYS {
                patterns.push(build(ConjunctionKind::Triple, &a, &b, window, TRIPLE_SIGNIFICANCE));
            }
        }

        if (a.as_str(), b.as_str()) == GRAND_PAIR {
            for event in &occurrences {
                patterns.push(build(ConjunctionKind::Grand, &a, &b, &[*event], GRAND_SIGNIFICANCE));
            }
        }
    }

    patterns.sort_by(|x, y| x.dates.first().cmp(&y.dates.first()).then(x.kind.as_str().cmp(y.kind.as_str())));
    log::debug!("Conjunction scan: {} patterns", patterns.len());
    patterns
}

fn build(kind: ConjunctionKind, a: &str, b: &str, members: &[&Event], significance: f64) -> ConjunctionPattern {
    ConjunctionPattern {
        kind,
        planets: [a.to_string(), b.to_string()],
        event_ids: members.iter().map(|e| e.id.clone()).collect(),
        dates: members.iter().map(|e| e.timestamp.date_naive()).collect(),
        significance,
    }
}
