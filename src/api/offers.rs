//! Promotional offer endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{created, done, success, ApiResult};
use crate::db::Query;
use crate::errors::AppError;
use crate::models::{Collection, CreateOfferRequest, Document, Offer};
use crate::AppState;

/// GET /api/offers - List active offers, newest first.
pub async fn list_offers(State(state): State<AppState>) -> ApiResult<Vec<Document<Offer>>> {
    let offers: Vec<Document<Offer>> = state
        .repo
        .list(Collection::Offers, &Query::new().filter("active", true).newest_first())
        .await?;
    tracing::debug!("Found {} active offers", offers.len());
    success(offers)
}

/// POST /api/offers - Add an offer (admin). New offers are always active.
pub async fn create_offer(
    State(state): State<AppState>,
    Json(request): Json<CreateOfferRequest>,
) -> ApiResult<Document<Offer>> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Offer title is required".to_string()));
    }

    let offer = state.repo.add(Collection::Offers, Offer::from(request)).await?;
    created(offer, "Offer added successfully")
}

/// DELETE /api/offers/{id} - Delete an offer (admin).
pub async fn delete_offer(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete(Collection::Offers, &id).await?;
    done("Offer deleted successfully")
}
