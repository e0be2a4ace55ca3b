//! Contact form and newsletter endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use super::{created, success, ApiResponse, ApiResult};
use crate::db::{now_timestamp, Query};
use crate::errors::AppError;
use crate::models::{
    default_status, Collection, Contact, Document, NewsletterSubscriber, SubscribeRequest,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: String,
}

/// POST /api/contact - Submit the contact form.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(mut contact): Json<Contact>,
) -> ApiResult<CreatedId> {
    if contact.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }
    contact.status = default_status();

    let doc = state.repo.add(Collection::Contacts, contact).await?;
    tracing::info!(id = %doc.id, "Contact form submitted");
    created(CreatedId { id: doc.id }, "Contact form submitted successfully")
}

/// GET /api/contact - List contact submissions, newest first (admin).
pub async fn list_contacts(State(state): State<AppState>) -> ApiResult<Vec<Document<Contact>>> {
    let contacts = state
        .repo
        .list(Collection::Contacts, &Query::new().newest_first())
        .await?;
    success(contacts)
}

/// POST /api/contact/newsletter - Subscribe an email address.
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> ApiResult<()> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let subscriber = NewsletterSubscriber {
        email: email.clone(),
        subscribed_at: Some(now_timestamp()),
        active: true,
    };
    if state
        .repo
        .add_unique(Collection::Newsletter, "email", &email, subscriber)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("Email already subscribed".to_string()));
    }

    Ok(ApiResponse::message_only("Successfully subscribed to newsletter")
        .with_status(axum::http::StatusCode::CREATED))
}

/// GET /api/contact/newsletter - List active subscribers, newest first (admin).
pub async fn list_subscribers(
    State(state): State<AppState>,
) -> ApiResult<Vec<Document<NewsletterSubscriber>>> {
    let subscribers = state
        .repo
        .list(
            Collection::Newsletter,
            &Query::new().filter("active", true).newest_first(),
        )
        .await?;
    success(subscribers)
}
