use actix_web::{http::header, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::models::{DeleteResponse, ListNeighborhoodsQuery, NeighborhoodPatch, NewNeighborhood};
use crate::routes::{error_response, AppState};
use crate::services::{AuthError, StoreError};

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/neighborhoods")
            .route(web::get().to(list_neighborhoods))
            .route(web::post().to(create_neighborhood)),
    )
    .service(
        web::resource("/neighborhoods/{id}")
            .route(web::get().to(get_neighborhood))
            .route(web::put().to(update_neighborhood))
            .route(web::delete().to(delete_neighborhood)),
    );
}

fn require_admin(state: &AppState, http_req: &HttpRequest) -> Result<(), HttpResponse> {
    let authorization = http_req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state
        .verifier
        .require_admin(authorization)
        .map(|claims| {
            tracing::debug!("Admin request by {:?} on {}", claims.sub, http_req.path());
        })
        .map_err(|e: AuthError| {
            tracing::warn!("Rejected admin request on {}: {}", http_req.path(), e);
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
            let label = match e {
                AuthError::NotAdmin => "Forbidden",
                AuthError::MissingToken | AuthError::InvalidToken => "Unauthorized",
            };
            error_response(status, label, e.to_string())
        })
}

/// Parse an admin request body; only called once the caller is authorized
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, HttpResponse> {
    serde_json::from_slice(body).map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", e))
    })
}

fn parse_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            "invalid_path",
            format!("Invalid path parameter: {}", e),
        )
    })
}

fn store_failure(action: &str, err: StoreError) -> HttpResponse {
    tracing::error!("Failed to {}: {}", action, err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Failed to {}", action),
        err.to_string(),
    )
}

fn not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, "Not found", "Not found")
}

/// GET /api/neighborhoods?city={city}
async fn list_neighborhoods(
    state: web::Data<AppState>,
    query: web::Query<ListNeighborhoodsQuery>,
) -> impl Responder {
    let city = query.city.as_deref().filter(|c| !c.is_empty());

    match state.store.fetch_candidates(city).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot.as_slice()),
        Err(e) => store_failure("list neighborhoods", e),
    }
}

/// GET /api/neighborhoods/{id}
async fn get_neighborhood(state: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    match state.store.get_by_id(id.into_inner()).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => not_found(),
        Err(e) => store_failure("fetch neighborhood", e),
    }
}

/// POST /api/neighborhoods (admin only)
///
/// Admin routes take the raw body and path so the token is checked before
/// anything the caller sent is parsed.
async fn create_neighborhood(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &http_req) {
        return response;
    }

    let req: NewNeighborhood = match parse_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for new neighborhood: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    match state.store.create(req).await {
        Ok(record) => {
            tracing::info!("Created neighborhood {} in {}", record.name, record.city);
            HttpResponse::Created().json(record)
        }
        Err(e) => store_failure("create neighborhood", e),
    }
}

/// PUT /api/neighborhoods/{id} (admin only)
///
/// Partial update: fields missing from the body are left unchanged.
async fn update_neighborhood(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    id: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &http_req) {
        return response;
    }

    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req: NeighborhoodPatch = match parse_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for neighborhood update: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    match state.store.update(id, req).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => not_found(),
        Err(e) => store_failure("update neighborhood", e),
    }
}

/// DELETE /api/neighborhoods/{id} (admin only)
async fn delete_neighborhood(
    state: web::Data<AppState>,
    http_req: HttpRequest,
    id: web::Path<String>,
) -> impl Responder {
    if let Err(response) = require_admin(&state, &http_req) {
        return response;
    }

    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.store.delete(id).await {
        Ok(true) => HttpResponse::Ok().json(DeleteResponse {
            message: "Deleted successfully".to_string(),
        }),
        Ok(false) => not_found(),
        Err(e) => store_failure("delete neighborhood", e),
    }
}
