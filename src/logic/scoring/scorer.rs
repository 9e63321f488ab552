//! Severity & Significance Scorer
//!
//! Deterministic additive bonuses, clipped at the end. Absent fields skip
//! their term; absent context scores the event alone.

use chrono::{Datelike, Utc};
use uuid::Uuid;

use super::rules::*;
use super::types::{Alert, AlertLevel, ScoringContext};
use crate::logic::events::{EclipseType, Event, EventType};
use crate::logic::patterns::Feast;

// ============================================================================
// MAIN SCORING FUNCTION
// ============================================================================

pub fn score_event(event: &Event, context: Option<&ScoringContext>) -> Alert {
    let empty = ScoringContext::default();
    let context = context.unwrap_or(&empty);
    let mut reasons = Vec::new();

    let severity = severity_score(event, context, &mut reasons);
    let (significance, references) = significance_score(event, context);
    let level = alert_level(severity);

    log::debug!(
        "Scored {} ({}): severity {:.1}, significance {:.2}, {:?}",
        event.id,
        event.event_type,
        severity,
        significance,
        level
    );

    Alert {
        alert_id: Uuid::new_v4(),
        event_ref: event.id.clone(),
        event_type: event.event_type,
        severity_score: severity,
        significance_score: significance,
        level,
        cluster_id: context.cluster_id,
        pattern_types: context.pattern_types.clone(),
        references,
        reasons,
        created_at: Utc::now(),
    }
}

pub fn alert_level(severity: f64) -> AlertLevel {
    if severity >= CRITICAL_SEVERITY_MIN {
        AlertLevel::Critical
    } else if severity >= HIGH_SEVERITY_MIN {
        AlertLevel::High
    } else if severity >= MEDIUM_SEVERITY_MIN {
        AlertLevel::Medium
    } else {
        AlertLevel::Low
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

fn severity_score(event: &Event, context: &ScoringContext, reasons: &mut Vec<String>) -> f64 {
    let mut score = BASE_SEVERITY;

    let bonus = type_bonus(event.event_type);
    if bonus > 0.0 {
        score += bonus;
        reasons.push(format!("{} event (+{})", event.event_type, bonus));
    }

    if let Some(km) = event.metadata.distance_to_earth_km {
        let bonus = proximity_bonus(km);
        if bonus > 0.0 {
            score += bonus;
            reasons.push(format!("Close approach: {:.0} km (+{})", km, bonus));
        }
    }

    if let Some(magnitude) = event.magnitude {
        let bonus = magnitude_bonus(event.event_type, magnitude);
        if bonus > 0.0 {
            score += bonus;
            reasons.push(format!("Magnitude {:.1} (+{})", magnitude, bonus));
        }
    }

    if event.event_type == EventType::Eclipse && event.metadata.eclipse_type == Some(EclipseType::Total) {
        score += TOTAL_ECLIPSE_BONUS;
        reasons.push(format!("Total eclipse (+{})", TOTAL_ECLIPSE_BONUS));
    }

    if context.in_tetrad {
        score += TETRAD_RARITY_BONUS;
        reasons.push(format!("Part of a tetrad (+{})", TETRAD_RARITY_BONUS));
    }
    if context.in_conjunction_pattern() {
        score += CONJUNCTION_PATTERN_RARITY_BONUS;
        reasons.push(format!("Part of a conjunction pattern (+{})", CONJUNCTION_PATTERN_RARITY_BONUS));
    }

    score.clamp(0.0, MAX_SEVERITY)
}

// ============================================================================
// SIGNIFICANCE
// ============================================================================

fn markers(event: &Event, context: &ScoringContext) -> Vec<SignificanceMarker> {
    let mut fired = Vec::new();

    if event.is_total_lunar_eclipse() {
        fired.push(SignificanceMarker::BloodMoon);
    }
    if event.is_solar_eclipse() {
        fired.push(SignificanceMarker::SolarEclipse);
    }
    if event.event_type == EventType::Conjunction || context.in_conjunction_pattern() {
        fired.push(SignificanceMarker::Conjunction);
    }
    if event.involves("jupiter") && event.involves("venus") {
        fired.push(SignificanceMarker::JupiterVenus);
    }
    if event.event_type == EventType::Neo {
        fired.push(SignificanceMarker::NearEarthObject);
    }
    if event.feast_day || Feast::for_month(event.timestamp.month()).is_some() {
        fired.push(SignificanceMarker::FeastMonth);
    }
    if context.in_tetrad {
        fired.push(SignificanceMarker::Tetrad);
    }
    if context.in_triple_conjunction {
        fired.push(SignificanceMarker::TripleConjunction);
    }

    fired
}

fn significance_score(event: &Event, context: &ScoringContext) -> (f64, Vec<String>) {
    let fired = markers(event, context);
    let score: f64 = fired.iter().map(|m| m.bonus()).sum();
    let references = fired.iter().map(|m| m.reference().to_string()).collect();
    (score.clamp(0.0, MAX_SIGNIFICANCE), references)
}
