//! Booking request endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map};

use super::{created, done, success, ApiResult};
use crate::auth::AuthUser;
use crate::db::Query;
use crate::errors::AppError;
use crate::handoff::{self, HandoffLinks, HandoffRequest};
use crate::models::{
    Booking, BookingStatus, Collection, CreateBookingRequest, Document, UpdateStatusRequest,
};
use crate::AppState;

/// POST /api/bookings - Create a booking request for the caller.
///
/// The agency inbox is notified in the background when SMTP is configured.
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<Document<Booking>> {
    if request.kind.trim().is_empty() {
        return Err(AppError::Validation("Booking type is required".to_string()));
    }

    let booking = request.into_booking(&user.uid, user.email.as_deref());
    let booking = state.repo.add(Collection::Bookings, booking).await?;
    tracing::info!(id = %booking.id, kind = %booking.data.kind, uid = %user.uid, "Booking created");

    if let Some(notifier) = state.notifier.clone() {
        let data = booking.data.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_booking(&data).await {
                tracing::warn!("Failed to send booking notification: {}", e);
            }
        });
    }

    created(booking, "Booking created successfully")
}

/// GET /api/bookings - List all bookings, newest first (admin).
pub async fn list_bookings(State(state): State<AppState>) -> ApiResult<Vec<Document<Booking>>> {
    let bookings = state
        .repo
        .list(Collection::Bookings, &Query::new().newest_first())
        .await?;
    success(bookings)
}

/// GET /api/bookings/user - List the caller's bookings, newest first.
pub async fn list_user_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<Document<Booking>>> {
    let bookings = state
        .repo
        .list(
            Collection::Bookings,
            &Query::new().filter("userId", user.uid.clone()).newest_first(),
        )
        .await?;
    success(bookings)
}

/// Load a booking the caller owns, or any booking for admins.
async fn owned_booking(state: &AppState, user: &AuthUser, id: &str) -> Result<Document<Booking>, AppError> {
    let booking: Document<Booking> = state
        .repo
        .get(Collection::Bookings, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if !user.can_access(&booking.data.user_id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok(booking)
}

/// GET /api/bookings/{id} - Get a booking (owner or admin).
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Document<Booking>> {
    success(owned_booking(&state, &user, &id).await?)
}

fn blocked(id: &str, from: BookingStatus, to: BookingStatus) -> AppError {
    tracing::warn!(id = %id, from = from.as_str(), to = to.as_str(), "Booking status change refused");
    AppError::Conflict(format!(
        "Cannot change booking status from {} to {}",
        from.as_str(),
        to.as_str()
    ))
}

/// Move a booking to `next`, enforcing the status lifecycle.
///
/// The write only lands while the stored status is still the one checked.
/// If another request got there first, the check runs again on the fresh status.
async fn transition(state: &AppState, booking: &Document<Booking>, next: BookingStatus) -> Result<(), AppError> {
    let mut current = booking.data.status;

    loop {
        if !current.can_transition_to(next) {
            return Err(blocked(&booking.id, current, next));
        }
        if current == next {
            return Ok(());
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(next.as_str()));
        let written = state
            .repo
            .update_where::<Booking>(Collection::Bookings, &booking.id, "status", current.as_str(), patch)
            .await?;

        if written.is_some() {
            tracing::info!(id = %booking.id, from = current.as_str(), to = next.as_str(), "Booking status changed");
            return Ok(());
        }

        let fresh: Document<Booking> = state
            .repo
            .get(Collection::Bookings, &booking.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        if fresh.data.status == current {
            // Stored status is missing or not a plain string.
            return Err(blocked(&booking.id, current, next));
        }
        current = fresh.data.status;
    }
}

/// PUT /api/bookings/{id}/cancel - Cancel a booking (owner or admin).
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let booking = owned_booking(&state, &user, &id).await?;
    transition(&state, &booking, BookingStatus::Cancelled).await?;
    done("Booking cancelled successfully")
}

/// PUT /api/bookings/{id}/status - Set a booking's status (admin).
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<()> {
    let next = BookingStatus::from_str(&request.status).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid status '{}': expected pending, confirmed or cancelled",
            request.status
        ))
    })?;

    let booking: Document<Booking> = state
        .repo
        .get(Collection::Bookings, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    transition(&state, &booking, next).await?;
    done("Booking status updated successfully")
}

/// DELETE /api/bookings/{id} - Delete a booking (admin).
pub async fn delete_booking(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete(Collection::Bookings, &id).await?;
    done("Booking deleted successfully")
}

/// POST /api/bookings/handoff - Build WhatsApp and email links for a booking request.
pub async fn booking_handoff(
    State(state): State<AppState>,
    Json(request): Json<HandoffRequest>,
) -> ApiResult<HandoffLinks> {
    let links = handoff::build_links(&state.config.handoff, &request)?;
    tracing::info!(kind = %request.kind, total = links.total_price, "Hand-off links built");
    success(links)
}

