//! NeighborFit - neighborhood matching and ranking service
//!
//! This library ranks the neighborhoods of a catalog against a user's
//! priorities over safety, pollution, cleanliness and greenery, with
//! optional city and budget filters. It also carries the catalog store and
//! the HTTP routes that expose it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_composite_score, MatchError, Matcher};
pub use crate::models::{MatchConstraints, MatchRequest, NeighborhoodRecord, RankedNeighborhood, WeightVector};
