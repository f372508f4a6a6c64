use crate::store::StoreError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// HTTP status code
    pub error: u16,
    /// Human readable message
    pub message: String,
    /// Machine readable code, present for authentication errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a message and status code
    pub fn new<S: ToString>(message: S, status_code: StatusCode) -> Self {
        Self {
            message: message.to_string(),
            status_code,
        }
    }

    /// Bad Request (400), used when required body fields are missing
    pub fn bad_request() -> Self {
        Self::new("Bad request", StatusCode::BAD_REQUEST)
    }

    /// Not Found (404)
    pub fn not_found() -> Self {
        Self::new("Not found", StatusCode::NOT_FOUND)
    }

    /// Method Not Allowed (405)
    pub fn method_not_allowed() -> Self {
        Self::new("method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    }

    /// Unprocessable Entity (422)
    pub fn unprocessable() -> Self {
        Self::new("unprocessable", StatusCode::UNPROCESSABLE_ENTITY)
    }

    /// Internal Server Error (500)
    pub fn internal() -> Self {
        Self::new("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::not_found(),
            StoreError::DuplicateTitle(_) => ApiError::unprocessable(),
            other => {
                log::error!("Drink store failure: {}", other);
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        log::debug!("Rejected request body: {}", rejection.body_text());
        match rejection {
            // Valid JSON that does not fit the drink payload
            JsonRejection::JsonDataError(_) => ApiError::unprocessable(),
            _ => ApiError::bad_request(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        log::debug!("Rejected path parameter: {}", rejection.body_text());
        ApiError::not_found()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse {
            success: false,
            error: self.status_code.as_u16(),
            message: self.message,
            code: None,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// Fallback for paths no route matches
pub(crate) async fn not_found_fallback() -> ApiError {
    ApiError::not_found()
}

/// Fallback for known paths called with an unsupported method
pub(crate) async fn method_not_allowed_fallback() -> ApiError {
    ApiError::method_not_allowed()
}
