use crate::models::{NeighborhoodRecord, WeightVector};

/// Upper bound of every metric and of the composite score
pub const MAX_METRIC: f64 = 100.0;

/// Calculate the composite score (0-100) of a neighborhood
///
/// Scoring formula:
/// score = round(
///     (safety * w_safety
///      + (100 - pollution) * w_pollution    # Lower pollution = higher score
///      + cleanliness * w_cleanliness
///      + greenery * w_greenery)
///     / (w_safety + w_pollution + w_cleanliness + w_greenery)
/// )
///
/// The weights must already have passed [`WeightVector::validate`]; with
/// non-negative weights and a positive sum this is a weighted average, so
/// the result always lies in 0..=100.
pub fn calculate_composite_score(record: &NeighborhoodRecord, weights: &WeightVector) -> u8 {
    let total_weight = weights.total();
    debug_assert!(total_weight > 0.0, "weights must be validated before scoring");

    let weighted_sum = f64::from(record.safety) * weights.safety
        + inverted(record.pollution) * weights.pollution
        + f64::from(record.cleanliness) * weights.cleanliness
        + f64::from(record.greenery) * weights.greenery;

    round_half_up(weighted_sum / total_weight)
}

/// Flip a lower-is-better metric so that higher is better
#[inline]
fn inverted(value: u8) -> f64 {
    MAX_METRIC - f64::from(value)
}

/// Round to the nearest integer, halves going up, clamped to 0..=100
#[inline]
fn round_half_up(value: f64) -> u8 {
    (value + 0.5).floor().clamp(0.0, MAX_METRIC) as u8
}
