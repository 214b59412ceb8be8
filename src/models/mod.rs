// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{MatchConstraints, NeighborhoodRecord, RankedNeighborhood, WeightVector};
pub use requests::{ListNeighborhoodsQuery, MatchRequest, NeighborhoodPatch, NewNeighborhood};
pub use responses::{DeleteResponse, ErrorResponse, HealthResponse};
