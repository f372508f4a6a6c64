pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod list;
pub(crate) mod update;

use crate::api::authn_middleware::{authorization_middleware, PermissionGuard};
use crate::state::AppState;
use axum::middleware;
use axum::routing::{self, get, patch, post, MethodRouter};
use axum::Router;

/// Wraps a route so it only runs for tokens granting `permission`
fn guarded(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    // route_layer keeps the guard off the 405 fallback
    route.route_layer(middleware::from_fn_with_state(
        PermissionGuard::new(state, permission),
        authorization_middleware,
    ))
}

/// Combines the drink routes, each guarded by its own permission
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/drinks",
            get(list::list_drinks).merge(guarded(post(create::create_drink), state, "post:drinks")),
        )
        .route(
            "/drinks-detail",
            guarded(get(list::list_drinks_detail), state, "get:drinks-detail"),
        )
        .route(
            "/drinks/{id}",
            guarded(patch(update::update_drink), state, "patch:drinks")
                .merge(guarded(routing::delete(delete::delete_drink), state, "delete:drinks")),
        )
}
