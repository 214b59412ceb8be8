use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use crate::core::MatchError;
use crate::models::{HealthResponse, MatchRequest};
use crate::routes::{error_response, AppState};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/match", web::post().to(find_matches));
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/match
///
/// Request body (every field optional, weights default to 25):
/// ```json
/// {
///   "safety": 40,
///   "pollution": 20,
///   "cleanliness": 20,
///   "greenery": 20,
///   "city": "Pune",
///   "maxBudget": 20000
/// }
/// ```
///
/// Responds with a JSON array of at most five neighborhoods, best first,
/// each carrying its integer `score`.
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    let weights = req.weights(state.matcher.default_weights());
    let constraints = req.constraints();

    // Reject bad weights before touching the store
    if let Err(e) = state.matcher.check_weights(&weights) {
        return match_error_response(e);
    }

    tracing::info!(
        "Matching neighborhoods: city={:?}, max_budget={:?}, weights={:?}",
        constraints.city,
        constraints.max_budget,
        weights
    );

    let candidates = match state.store.fetch_candidates(constraints.city.as_deref()).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to fetch candidates: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch neighborhoods",
                e.to_string(),
            );
        }
    };

    tracing::debug!("Scoring {} candidates", candidates.len());

    match state.matcher.rank(&weights, &constraints, &candidates) {
        Ok(ranked) => {
            tracing::info!(
                "Returning {} matches (from {} candidates)",
                ranked.len(),
                candidates.len()
            );
            HttpResponse::Ok().json(ranked)
        }
        Err(e) => match_error_response(e),
    }
}

fn match_error_response(err: MatchError) -> HttpResponse {
    match &err {
        MatchError::Validation(_) => {
            tracing::info!("Rejected match request: {}", err);
            error_response(StatusCode::BAD_REQUEST, "Validation failed", err.to_string())
        }
        MatchError::NoMatch { .. } => {
            tracing::info!("{}", err);
            error_response(StatusCode::NOT_FOUND, "No match", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_error_status_codes() {
        let bad = match_error_response(MatchError::Validation("weights must not all be zero".into()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = match_error_response(MatchError::NoMatch {
            city: Some("Atlantis".into()),
        });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
