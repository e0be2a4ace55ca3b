//! REST API module.
//!
//! Contains all API routes and handlers following the web client contract.

mod auth;
mod bookings;
mod cars;
mod contact;
mod offers;
mod payment;
mod reviews;
mod tours;
mod travel;

pub use auth::*;
pub use bookings::*;
pub use cars::*;
pub use contact::*;
pub use offers::*;
pub use payment::*;
pub use reviews::*;
pub use tours::*;
pub use travel::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            status: StatusCode::OK,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl ApiResponse<()> {
    /// An envelope carrying only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a 201 response for a newly added document.
pub fn created<T: Serialize>(data: T, message: &str) -> ApiResult<T> {
    Ok(ApiResponse::new(data)
        .with_message(message)
        .with_status(StatusCode::CREATED))
}

/// Create a message-only response.
pub fn done(message: &str) -> ApiResult<()> {
    Ok(ApiResponse::message_only(message))
}

/// Require a JSON object body, as used for partial updates.
pub(crate) fn object_body(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(object) => Ok(object),
        _ => Err(AppError::Validation("Request body must be a JSON object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let value = serde_json::to_value(ApiResponse::new(vec![1, 2])).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": [1, 2]}));

        let value = serde_json::to_value(ApiResponse::message_only("Car deleted successfully")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": true, "message": "Car deleted successfully"})
        );
    }

    #[test]
    fn test_created_status() {
        let response = created("x", "Created").unwrap().into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_object_body_rejects_arrays() {
        assert!(object_body(serde_json::json!([1])).is_err());
        assert!(object_body(serde_json::json!({"a": 1})).is_ok());
    }
}
