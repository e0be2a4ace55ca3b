//! Customer review endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{created, done, success, ApiResult};
use crate::db::{now_timestamp, Query};
use crate::errors::AppError;
use crate::models::{Collection, CreateReviewRequest, Document, Review, MAX_RATING, MIN_RATING};
use crate::AppState;

/// GET /api/reviews - List reviews, newest first.
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Vec<Document<Review>>> {
    let reviews = state
        .repo
        .list(Collection::Reviews, &Query::new().newest_first())
        .await?;
    success(reviews)
}

/// POST /api/reviews - Add a review (admin). Reviews added here are pre-approved.
pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> ApiResult<Document<Review>> {
    let rating = match request.rating {
        Some(r) if (MIN_RATING..=MAX_RATING).contains(&r) => r,
        _ => {
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )))
        }
    };
    if request.user_name.trim().is_empty() {
        return Err(AppError::Validation("Reviewer name is required".to_string()));
    }

    let review = Review {
        user_name: request.user_name,
        user_email: request.user_email,
        rating: Some(rating),
        comment: request.comment,
        car_id: request.car_id.filter(|id| !id.is_empty()),
        approved: true,
        date: Some(now_timestamp()),
    };

    let review = state.repo.add(Collection::Reviews, review).await?;
    created(review, "Review added successfully")
}

/// DELETE /api/reviews/{id} - Delete a review (admin).
pub async fn delete_review(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete(Collection::Reviews, &id).await?;
    done("Review deleted successfully")
}
