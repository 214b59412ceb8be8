use crate::models::{MatchConstraints, NeighborhoodRecord};

/// Check the city constraint
///
/// City matching is exact and case-sensitive. No city means every city.
#[inline]
pub fn matches_city(record: &NeighborhoodRecord, city: Option<&str>) -> bool {
    match city {
        Some(city) => record.city == city,
        None => true,
    }
}

/// Check the budget constraint (inclusive upper bound)
#[inline]
pub fn within_budget(record: &NeighborhoodRecord, max_budget: Option<f64>) -> bool {
    match max_budget {
        Some(max) => record.budget <= max,
        None => true,
    }
}

/// Check every hard filter of a match request
///
/// Hard filters exclude a candidate outright; they never adjust its score.
#[inline]
pub fn matches_constraints(record: &NeighborhoodRecord, constraints: &MatchConstraints) -> bool {
    matches_city(record, constraints.city.as_deref())
        && within_budget(record, constraints.max_budget)
}
