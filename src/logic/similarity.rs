//! Historical similarity search over standardized event vectors.
//!
//! Only the upper triangle (i < j) is scanned, so a pair never appears twice
//! and self-pairs never appear. Scores rank pairs; they are not probabilities.

use serde::{Deserialize, Serialize};

use crate::logic::features::{to_matrix, EventPoint, StandardScaler};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMatch {
    pub event_a: String,
    pub event_b: String,
    pub similarity: f64,
}

/// Compute cosine similarity between two vectors. 0 for empty, mismatched or zero vectors.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    dot / denom
}

/// Top-k most similar pairs at or above `min_similarity`, descending
pub fn find_similar_pairs(points: &[EventPoint], min_similarity: f64, top_k: usize) -> Vec<HistoricalMatch> {
    if points.len() < 2 {
        return vec![];
    }

    let raw = to_matrix(points.iter().map(|p| &p.vector));
    let (_, scaled) = StandardScaler::fit_transform(&raw);
    let rows: Vec<Vec<f64>> = scaled.rows().into_iter().map(|r| r.to_vec()).collect();

    let mut matches = Vec::new();
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let similarity = cosine_similarity(&rows[i], &rows[j]);
            if similarity >= min_similarity {
                matches.push(HistoricalMatch {
                    event_a: points[i].event_id.clone(),
                    event_b: points[j].event_id.clone(),
                    similarity,
                });
            }
        }
    }

    matches.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.event_a.cmp(&b.event_a))
            .then_with(|| a.event_b.cmp(&b.event_b))
    });
    matches.truncate(top_k);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::events::{EclipseBody, EclipseType, Event, EventType};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = [0.3, -1.2, 4.0, 0.0];
        let b = [2.0, 0.5, -0.7, 1.1];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    fn events() -> Vec<Event> {
        let t = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        vec![
            Event::new("q1", EventType::Earthquake, t(2011, 3, 11)).with_magnitude(9.1).with_location(38.3, 142.4),
            Event::new("q2", EventType::Earthquake, t(2011, 3, 12)).with_magnitude(9.0).with_location(38.2, 142.3),
            Event::new("e1", EventType::Eclipse, t(2017, 8, 21)).with_eclipse(EclipseBody::Solar, EclipseType::Total),
            Event::new("h1", EventType::Hurricane, t(2005, 8, 29)).with_magnitude(3.0).with_location(29.9, -90.1),
        ]
    }

    #[test]
    fn test_no_self_or_reciprocal_pairs() {
        let points: Vec<EventPoint> = events().iter().map(EventPoint::from_event).collect();
        let matches = find_similar_pairs(&points, -2.0, 100);
        assert_eq!(matches.len(), 6);
        for m in &matches {
            assert_ne!(m.event_a, m.event_b);
            assert!(!matches.iter().any(|o| o.event_a == m.event_b && o.event_b == m.event_a));
        }
    }

    #[test]
    fn test_near_duplicates_rank_first() {
        let points: Vec<EventPoint> = events().iter().map(EventPoint::from_event).collect();
        let matches = find_similar_pairs(&points, 0.85, 10);
        assert!(!matches.is_empty());
        assert_eq!((matches[0].event_a.as_str(), matches[0].event_b.as_str()), ("q1", "q2"));
        assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_truncates_to_top_k() {
        let points: Vec<EventPoint> = events().iter().map(EventPoint::from_event).collect();
        assert_eq!(find_similar_pairs(&points, -2.0, 2).len(), 2);
        assert!(find_similar_pairs(&points[..1], -1.0, 10).is_empty());
    }
}
