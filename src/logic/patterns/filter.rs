//! Pattern Post-Filter
//!
//! The window scans emit every qualifying window, so overlapping windows show
//! up as near-identical patterns. Which of them survive is decided here and
//! nowhere else.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::PatternIdentity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFilter {
    /// Keep every emitted window
    #[default]
    KeepAll,
    /// Greedy, in input order: drop a pattern that shares any event with an
    /// already kept pattern of the same kind
    Distinct,
}

impl PatternFilter {
    pub fn from_flag(distinct: bool) -> Self {
        if distinct { PatternFilter::Distinct } else { PatternFilter::KeepAll }
    }

    pub fn apply<P: PatternIdentity>(&self, patterns: Vec<P>) -> Vec<P> {
        match self {
            PatternFilter::KeepAll => patterns,
            PatternFilter::Distinct => {
                let mut claimed: HashSet<(&'static str, String)> = HashSet::new();
                let mut kept = Vec::with_capacity(patterns.len());
                for pattern in patterns {
                    let kind = pattern.kind();
                    let overlaps = pattern
                        .member_ids()
                        .iter()
                        .any(|id| claimed.contains(&(kind, id.clone())));
                    if overlaps {
                        continue;
                    }
                    for id in pattern.member_ids() {
                        claimed.insert((kind, id.clone()));
                    }
                    kept.push(pattern);
                }
                kept
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::patterns::types::{ConjunctionKind, ConjunctionPattern};

    fn triple(ids: &[&str]) -> ConjunctionPattern {
        ConjunctionPattern {
            kind: ConjunctionKind::Triple,
            planets: ["mars".to_string(), "venus".to_string()],
            event_ids: ids.iter().map(|s| s.to_string()).collect(),
            dates: vec![],
            significance: 0.8,
        }
    }

    fn grand(id: &str) -> ConjunctionPattern {
        ConjunctionPattern {
            kind: ConjunctionKind::Grand,
            ..triple(&[id])
        }
    }

    #[test]
    fn test_keep_all_is_identity() {
        let patterns = vec![triple(&["a", "b", "c"]), triple(&["b", "c", "d"])];
        assert_eq!(PatternFilter::KeepAll.apply(patterns.clone()), patterns);
    }

    #[test]
    fn test_distinct_drops_overlap() {
        let patterns = vec![triple(&["a", "b", "c"]), triple(&["b", "c", "d"]), triple(&["d", "e", "f"])];
        let kept = PatternFilter::Distinct.apply(patterns);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].event_ids[0], "d");
    }

    #[test]
    fn test_distinct_is_per_kind() {
        let patterns = vec![triple(&["a", "b", "c"]), grand("a")];
        assert_eq!(PatternFilter::Distinct.apply(patterns).len(), 2);
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(PatternFilter::from_flag(false), PatternFilter::KeepAll);
        assert_eq!(PatternFilter::from_flag(true), PatternFilter::Distinct);
    }
}
