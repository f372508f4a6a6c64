use crate::auth::{check_permissions, get_token_auth_header, AuthError, TokenVerifier};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use log::{debug, warn};
use std::sync::Arc;

/// State handed to [`authorization_middleware`]: the verifier plus the one
/// permission the guarded route demands
#[derive(Clone)]
pub(super) struct PermissionGuard {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl PermissionGuard {
    pub(super) fn new(state: &AppState, permission: &'static str) -> Self {
        Self {
            verifier: state.verifier.clone(),
            permission,
        }
    }
}

/// Extracts and verifies the bearer token, checks the required permission and
/// hands the decoded claims to the handler as a request extension
pub(super) async fn authorization_middleware(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = get_token_auth_header(request.headers())?.to_owned();

    let claims = guard.verifier.verify(&token).await.map_err(|e| {
        warn!("Rejected token for '{}': {}", guard.permission, e);
        AuthError::from(e)
    })?;

    check_permissions(guard.permission, &claims)?;
    debug!("'{}' granted '{}'", claims.sub, guard.permission);

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
