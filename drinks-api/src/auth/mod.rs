//! Bearer token authorization: header extraction, key set lookup, signature
//! verification and permission checks.

pub mod claims;
pub mod header;
pub mod verifier;

pub use claims::{check_permissions, Claims};
pub use header::get_token_auth_header;
pub use verifier::TokenVerifier;

use crate::errors::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Machine readable reason attached to every authentication failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    InvalidHeader,
    InvalidClaims,
    TokenExpired,
    Unauthorized,
    JwksUnavailable,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidHeader => "invalid_header",
            Self::InvalidClaims => "invalid_claims",
            Self::TokenExpired => "token_expired",
            Self::Unauthorized => "unauthorized",
            Self::JwksUnavailable => "jwks_unavailable",
        }
    }
}

/// Authentication or authorization failure, rendered from its own fields
#[derive(Debug, Clone, PartialEq)]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub description: String,
    pub status_code: StatusCode,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, description: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            code,
            description: description.into(),
            status_code,
        }
    }

    pub fn invalid_header(description: impl Into<String>, status_code: StatusCode) -> Self {
        Self::new(AuthErrorCode::InvalidHeader, description, status_code)
    }

    pub fn invalid_claims(description: impl Into<String>, status_code: StatusCode) -> Self {
        Self::new(AuthErrorCode::InvalidClaims, description, status_code)
    }

    pub fn token_expired() -> Self {
        Self::new(
            AuthErrorCode::TokenExpired,
            "Token expired.",
            StatusCode::UNAUTHORIZED,
        )
    }

    /// 403, the token is valid but lacks the permission
    pub fn unauthorized(description: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::Unauthorized, description, StatusCode::FORBIDDEN)
    }

    /// 502, the issuer's key set could not be obtained
    pub fn jwks_unavailable() -> Self {
        Self::new(
            AuthErrorCode::JwksUnavailable,
            "Unable to fetch the signing keys.",
            StatusCode::BAD_GATEWAY,
        )
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.code.as_str(), self.status_code, self.description)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.status_code.as_u16(),
            message: self.description,
            code: Some(self.code.as_str().to_string()),
        };
        (self.status_code, Json(body)).into_response()
    }
}
