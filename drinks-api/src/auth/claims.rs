use super::AuthError;
use http::StatusCode;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `aud` may be a single string or a list of strings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

/// Decoded token payload handed to protected handlers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject the token was issued to
    #[serde(default)]
    pub sub: String,
    pub iss: String,
    pub aud: Audience,
    /// Expiry as seconds since the epoch
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Granted permissions; `None` when the claim is absent from the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    /// Any other claims, kept as issued
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Checks that `claims` grant `permission`.
///
/// A token without a `permissions` claim is malformed (400); a token lacking
/// the permission is forbidden (403).
pub fn check_permissions(permission: &str, claims: &Claims) -> Result<(), AuthError> {
    let Some(permissions) = &claims.permissions else {
        warn!("Token for '{}' carries no permissions claim", claims.sub);
        return Err(AuthError::invalid_claims(
            "Permissions not included in JWT.",
            StatusCode::BAD_REQUEST,
        ));
    };

    if !permissions.iter().any(|p| p == permission) {
        warn!(
            "Token for '{}' lacks permission '{}'",
            claims.sub, permission
        );
        return Err(AuthError::unauthorized("Permission not found."));
    }

    Ok(())
}
