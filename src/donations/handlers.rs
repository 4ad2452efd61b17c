use super::models::DonationInput;
use super::store::parse_id;
use super::validators::{validate_create, validate_update};
use crate::common::{ApiError, ApiResponse, AppState};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

// ============================================================================
// Donation CRUD Handlers
// ============================================================================

/// GET /api/donations - All donations, newest first
pub async fn list_donations(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let donations = state.store.list_all().await?;

    Ok(Json(ApiResponse::ok(donations)))
}

/// POST /api/donations - Create a donation
pub async fn create_donation(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<DonationInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(invalid_body)?;

    let record = validate_create(&input)?;
    let donation = state.store.create(record).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            donation,
            "Donation created successfully",
        )),
    ))
}

/// GET /api/donations/:id - One donation
pub async fn get_donation(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let donation = state.store.get_by_id(id).await?;

    Ok(Json(ApiResponse::ok(donation)))
}

/// PUT /api/donations/:id - Change the supplied fields of a donation
pub async fn update_donation(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<DonationInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload.map_err(invalid_body)?;

    let patch = validate_update(&input)?;
    let donation = state.store.update(id, patch).await?;

    Ok(Json(ApiResponse::ok_with_message(
        donation,
        "Donation updated successfully",
    )))
}

/// DELETE /api/donations/:id - Remove a donation
pub async fn delete_donation(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound(format!("Donation {} not found", id)));
    }

    Ok(Json(ApiResponse::message("Donation deleted successfully")))
}

/// GET /api/health - Liveness plus a storage round trip
pub async fn health(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.ping().await?;

    Ok(Json(ApiResponse::ok(HealthStatus { status: "ok" })))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidArgument(format!("Invalid JSON body: {}", rejection.body_text()))
}
