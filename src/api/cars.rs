//! Car catalogue endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use super::{created, done, object_body, success, ApiResponse, ApiResult};
use crate::db;
use crate::errors::AppError;
use crate::models::{Car, CarSearchQuery, Collection, Document};
use crate::AppState;

/// GET /api/cars - List all cars.
pub async fn list_cars(State(state): State<AppState>) -> ApiResult<Vec<Document<Car>>> {
    let cars = state.repo.list(Collection::Cars, &db::Query::new()).await?;
    success(cars)
}

/// GET /api/cars/search - Filter by category, price range and free text.
pub async fn search_cars(
    State(state): State<AppState>,
    Query(params): Query<CarSearchQuery>,
) -> ApiResult<Vec<Document<Car>>> {
    let mut query = db::Query::new();
    if let Some(category) = params.category_filter() {
        query = query.filter("category", category.to_string());
    }

    let cars: Vec<Document<Car>> = state.repo.list(Collection::Cars, &query).await?;
    let matching = cars
        .into_iter()
        .filter(|doc| params.matches(&doc.data))
        .collect();
    success(matching)
}

/// GET /api/cars/{id} - Get a single car.
pub async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document<Car>> {
    match state.repo.get(Collection::Cars, &id).await? {
        Some(car) => success(car),
        None => Err(AppError::NotFound("Car not found".to_string())),
    }
}

/// POST /api/cars - Create a car (admin).
pub async fn create_car(State(state): State<AppState>, Json(car): Json<Car>) -> ApiResult<Document<Car>> {
    if car.name.trim().is_empty() {
        return Err(AppError::Validation("Car name is required".to_string()));
    }

    let car = state.repo.add(Collection::Cars, car).await?;
    tracing::info!(id = %car.id, name = %car.data.name, "Car created");
    created(car, "Car created successfully")
}

/// PUT /api/cars/{id} - Merge fields into a car (admin).
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Document<Car>> {
    let patch = object_body(body)?;
    if patch.get("name").and_then(Value::as_str).is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Car name cannot be empty".to_string()));
    }

    let car = state.repo.update(Collection::Cars, &id, patch).await?;
    Ok(ApiResponse::new(car).with_message("Car updated successfully"))
}

/// DELETE /api/cars/{id} - Delete a car (admin).
pub async fn delete_car(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete(Collection::Cars, &id).await?;
    done("Car deleted successfully")
}
