//! Pattern Types
//!
//! Data structures only. Detection lives in `tetrad.rs` / `conjunction.rs`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEAST SEASONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feast {
    /// Spring (March/April)
    Passover,
    /// Autumn (September/October)
    Tabernacles,
}

impl Feast {
    /// Month heuristic shared by the tetrad detector and the scorer
    pub fn for_month(month: u32) -> Option<Feast> {
        match month {
            3 | 4 => Some(Feast::Passover),
            9 | 10 => Some(Feast::Tabernacles),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feast::Passover => "passover",
            Feast::Tabernacles => "tabernacles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeastAlignment {
    pub date: NaiveDate,
    pub feast: Feast,
}

// ============================================================================
// TETRAD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TetradPattern {
    pub event_ids: [String; 4],
    pub eclipse_dates: [NaiveDate; 4],
    pub feast_alignments: Vec<FeastAlignment>,
    pub significance: f64,
}

impl TetradPattern {
    pub fn has_feast(&self, feast: Feast) -> bool {
        self.feast_alignments.iter().any(|a| a.feast == feast)
    }

    pub fn span_days(&self) -> i64 {
        (self.eclipse_dates[3] - self.eclipse_dates[0]).num_days()
    }
}

// ============================================================================
// CONJUNCTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConjunctionKind {
    /// Same planet pair three times within a year
    Triple,
    /// Any Jupiter-Saturn conjunction
    Grand,
}

impl ConjunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConjunctionKind::Triple => "triple_conjunction",
            ConjunctionKind::Grand => "grand_conjunction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionPattern {
    pub kind: ConjunctionKind,
    /// Sorted, lowercased pair
    pub planets: [String; 2],
    pub event_ids: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub significance: f64,
}

// ============================================================================
// PATTERN IDENTITY
// ============================================================================

/// What the post-filter needs to know about a pattern
pub trait PatternIdentity {
    /// Stable kind label
    fn kind(&self) -> &'static str;
    /// Events making up the pattern
    fn member_ids(&self) -> &[String];
}

impl PatternIdentity for TetradPattern {
    fn kind(&self) -> &'static str {
        "tetrad"
    }

    fn member_ids(&self) -> &[String] {
        &self.event_ids
    }
}

impl PatternIdentity for ConjunctionPattern {
    fn kind(&self) -> &'static str {
        self.kind.as_str()
    }

    fn member_ids(&self) -> &[String] {
        &self.event_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feast_months() {
        assert_eq!(Feast::for_month(3), Some(Feast::Passover));
        assert_eq!(Feast::for_month(4), Some(Feast::Passover));
        assert_eq!(Feast::for_month(9), Some(Feast::Tabernacles));
        assert_eq!(Feast::for_month(10), Some(Feast::Tabernacles));
        assert_eq!(Feast::for_month(1), None);
        assert_eq!(Feast::for_month(12), None);
    }
}
