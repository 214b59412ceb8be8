use thiserror::Error;

use crate::core::{filters::matches_constraints, scoring::calculate_composite_score};
use crate::models::{MatchConstraints, NeighborhoodRecord, RankedNeighborhood, WeightVector};

/// Default number of ranked results returned per request
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Ways a match request can end without a ranked list
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The request itself is unusable (bad weights)
    #[error("Invalid weights: {0}")]
    Validation(String),

    /// Nothing survived the hard filters
    #[error("{}", no_match_message(.city.as_deref()))]
    NoMatch { city: Option<String> },
}

fn no_match_message(city: Option<&str>) -> String {
    match city {
        Some(city) => format!("No neighborhoods found in {}", city),
        None => "No neighborhoods found".to_string(),
    }
}

/// Matching and ranking engine
///
/// # Pipeline Stages
/// 1. Weight validation
/// 2. Hard filters (city, budget)
/// 3. Composite scoring
/// 4. Stable ranking and truncation
///
/// The matcher holds only configuration and never mutates its input, so a
/// single instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct Matcher {
    default_weights: WeightVector,
    max_results: usize,
}

impl Matcher {
    pub fn new(default_weights: WeightVector, max_results: usize) -> Self {
        Self {
            default_weights,
            max_results,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(WeightVector::default(), DEFAULT_MAX_RESULTS)
    }

    /// Weights used for any metric the caller leaves out
    pub fn default_weights(&self) -> &WeightVector {
        &self.default_weights
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Reject weights that cannot produce a defined score
    pub fn check_weights(&self, weights: &WeightVector) -> Result<(), MatchError> {
        weights.validate().map_err(MatchError::Validation)
    }

    /// Rank a candidate snapshot for one request
    ///
    /// # Arguments
    /// * `weights` - Relative importance of each metric (already default-filled)
    /// * `constraints` - City and budget hard filters
    /// * `candidates` - Snapshot from the candidate store, usually already
    ///   narrowed to the requested city
    ///
    /// # Returns
    /// At most `max_results` neighborhoods, best first. Equal scores keep
    /// the order in which `candidates` listed them.
    pub fn rank(
        &self,
        weights: &WeightVector,
        constraints: &MatchConstraints,
        candidates: &[NeighborhoodRecord],
    ) -> Result<Vec<RankedNeighborhood>, MatchError> {
        self.check_weights(weights)?;

        let survivors: Vec<&NeighborhoodRecord> = candidates
            .iter()
            .filter(|record| matches_constraints(record, constraints))
            .collect();

        if survivors.is_empty() {
            return Err(MatchError::NoMatch {
                city: constraints.city.clone(),
            });
        }

        let mut ranked: Vec<RankedNeighborhood> = survivors
            .into_iter()
            .map(|record| RankedNeighborhood {
                score: calculate_composite_score(record, weights),
                neighborhood: record.clone(),
            })
            .collect();

        // sort_by is stable: ties keep snapshot order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.max_results);

        Ok(ranked)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
