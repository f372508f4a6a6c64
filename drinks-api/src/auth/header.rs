use super::AuthError;
use http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use log::warn;

/// Returns the raw token from an `Authorization: Bearer <token>` header.
///
/// The header must hold exactly two single-space separated parts, the first
/// being `bearer` in any case and the second non-empty.
pub fn get_token_auth_header(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or_else(|| {
        warn!("Missing Authorization header");
        AuthError::invalid_header("Authorization header is expected.", StatusCode::UNAUTHORIZED)
    })?;

    let value = header.to_str().map_err(|e| {
        warn!("Failed to parse Authorization header to string: {}", e);
        AuthError::invalid_header(
            "Authorization header must be a visible ASCII string.",
            StatusCode::UNAUTHORIZED,
        )
    })?;

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        warn!(
            "Authorization header has {} parts instead of 2",
            parts.len()
        );
        return Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
            StatusCode::UNAUTHORIZED,
        ));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        warn!("Authorization header uses unsupported scheme '{}'", scheme);
        return Err(AuthError::invalid_header(
            "Authorization header must start with \"Bearer\".",
            StatusCode::UNAUTHORIZED,
        ));
    }

    if token.is_empty() {
        warn!("Authorization header carries an empty token");
        return Err(AuthError::invalid_header(
            "Token not found.",
            StatusCode::UNAUTHORIZED,
        ));
    }

    Ok(*token)
}
