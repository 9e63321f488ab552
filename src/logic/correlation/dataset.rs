//! Training Set Construction
//!
//! One sample per calendar day of the historical span. The label is 1 when a
//! qualifying disaster falls on the same day or within the following
//! `time_window_days`; features come from trailing precursor windows, so no
//! sample sees the disaster it is labelled with.

use chrono::NaiveDate;
use ndarray::Array2;

use super::calendar::day_number;
use super::hypothesis::Hypothesis;
use super::precursors::{evaluate, PrecursorIndex};
use crate::logic::events::Event;
use crate::logic::source::HistoricalStream;

#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub hypothesis: Hypothesis,
    pub dates: Vec<NaiveDate>,
    pub features: Array2<f64>,
    pub labels: Vec<u8>,
}

impl TrainingSet {
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_positive(&self) -> usize {
        self.labels.iter().filter(|&&y| y == 1).count()
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.hypothesis.feature_names()
    }
}

/// Every day from `start` to `end`, both inclusive. Empty when `end < start`.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// Labels for `dates`. Pure in its inputs, so repeated calls agree.
pub fn build_labels(hypothesis: Hypothesis, events: &[Event], dates: &[NaiveDate]) -> Vec<u8> {
    let window = hypothesis.spec().time_window_days;

    let mut disaster_days: Vec<i64> = events
        .iter()
        .filter(|e| hypothesis.is_qualifying_disaster(e))
        .map(|e| day_number(e.timestamp.date_naive()))
        .collect();
    disaster_days.sort_unstable();

    dates
        .iter()
        .map(|date| {
            let day = day_number(*date);
            let next = disaster_days.partition_point(|&d| d < day);
            match disaster_days.get(next) {
                Some(&d) if d <= day + window => 1,
                _ => 0,
            }
        })
        .collect()
}

pub fn build_features(hypothesis: Hypothesis, index: &PrecursorIndex, dates: &[NaiveDate]) -> Array2<f64> {
    let schema = hypothesis.spec().features;
    let mut matrix = Array2::<f64>::zeros((dates.len(), schema.len()));
    for (i, date) in dates.iter().enumerate() {
        for (j, value) in evaluate(schema, index, *date).into_iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }
    matrix
}

pub fn build_dataset(hypothesis: Hypothesis, stream: &HistoricalStream) -> TrainingSet {
    let dates = day_range(stream.start, stream.end);
    let index = PrecursorIndex::new(&stream.events);

    TrainingSet {
        hypothesis,
        features: build_features(hypothesis, &index, &dates),
        labels: build_labels(hypothesis, &stream.events, &dates),
        dates,
    }
}

/// Fresh precursor vector for `date` from recent events, for risk prediction
pub fn current_features(hypothesis: Hypothesis, recent_events: &[Event], date: NaiveDate) -> Vec<f64> {
    let index = PrecursorIndex::new(recent_events);
    evaluate(hypothesis.spec().features, &index, date)
}
