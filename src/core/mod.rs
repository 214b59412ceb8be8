// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use filters::{matches_city, matches_constraints, within_budget};
pub use matcher::{MatchError, Matcher, DEFAULT_MAX_RESULTS};
pub use scoring::calculate_composite_score;
