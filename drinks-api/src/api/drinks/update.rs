use crate::auth::Claims;
use crate::errors::{ApiError, ErrorResponse};
use crate::models::{DrinkPayload, DrinksResponse};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use crate::store::DrinkRepository;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Json, Path, State};
use log::info;

/// Partial update: only the fields present in the body change
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    request_body = DrinkPayload,
    params(
        ("id" = i64, Path, description = "Drink identifier"),
        ("Authorization" = String, Header, description = "Bearer token with patch:drinks"),
    ),
    responses(
        (status = 200, description = "The updated drink in long form", body = DrinksResponse),
        (status = 400, description = "Neither title nor recipe given, or malformed JSON", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission not granted", body = ErrorResponse),
        (status = 404, description = "No drink with this id", body = ErrorResponse),
        (status = 422, description = "Wrong field types or duplicate title", body = ErrorResponse)
    )
)]
pub(crate) async fn update_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let changes = payload.into_changes();
    if changes.is_empty() {
        return Err(ApiError::bad_request());
    }

    let drink = state.store.update(id, changes).await?;
    info!("'{}' updated drink {}", claims.sub, drink.id);

    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink],
    }))
}
