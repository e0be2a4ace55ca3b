//! Tour package endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use super::{created, done, object_body, success, ApiResponse, ApiResult};
use crate::db;
use crate::errors::AppError;
use crate::models::{Collection, Document, Tour};
use crate::AppState;

/// GET /api/tours - List all tour packages.
pub async fn list_tours(State(state): State<AppState>) -> ApiResult<Vec<Document<Tour>>> {
    let tours = state.repo.list(Collection::Tours, &db::Query::new()).await?;
    success(tours)
}

/// GET /api/tours/{id} - Get a single tour package.
pub async fn get_tour(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document<Tour>> {
    match state.repo.get(Collection::Tours, &id).await? {
        Some(tour) => success(tour),
        None => Err(AppError::NotFound("Tour not found".to_string())),
    }
}

/// POST /api/tours - Create a tour package (admin).
///
/// Delimited-string list fields are stored already split.
pub async fn create_tour(State(state): State<AppState>, Json(tour): Json<Tour>) -> ApiResult<Document<Tour>> {
    if tour.title.trim().is_empty() {
        return Err(AppError::Validation("Tour title is required".to_string()));
    }

    let tour = state.repo.add(Collection::Tours, tour).await?;
    tracing::info!(id = %tour.id, title = %tour.data.title, "Tour created");
    created(tour, "Tour created successfully")
}

/// PUT /api/tours/{id} - Merge fields into a tour package (admin).
pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Document<Tour>> {
    let patch = object_body(body)?;
    if patch.get("title").and_then(Value::as_str).is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("Tour title cannot be empty".to_string()));
    }

    let tour = state.repo.update(Collection::Tours, &id, patch).await?;
    Ok(ApiResponse::new(tour).with_message("Tour updated successfully"))
}

/// DELETE /api/tours/{id} - Delete a tour package (admin).
pub async fn delete_tour(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete(Collection::Tours, &id).await?;
    done("Tour deleted successfully")
}
