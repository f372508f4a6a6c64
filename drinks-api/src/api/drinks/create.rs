use crate::auth::Claims;
use crate::errors::{ApiError, ErrorResponse};
use crate::models::{DrinkPayload, DrinksResponse};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use crate::store::DrinkRepository;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, State};
use log::info;

#[utoipa::path(
    post,
    path = "/drinks",
    tag = DRINKS_TAG,
    request_body = DrinkPayload,
    params(
        ("Authorization" = String, Header, description = "Bearer token with post:drinks"),
    ),
    responses(
        (status = 200, description = "The created drink in long form", body = DrinksResponse),
        (status = 400, description = "Missing title or recipe, or malformed JSON", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission not granted", body = ErrorResponse),
        (status = 422, description = "Wrong field types or duplicate title", body = ErrorResponse)
    )
)]
pub(crate) async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let Json(payload) = payload?;
    let new_drink = payload.into_new_drink().ok_or_else(ApiError::bad_request)?;

    let drink = state.store.insert(new_drink).await?;
    info!("'{}' created drink {} '{}'", claims.sub, drink.id, drink.title);

    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink],
    }))
}
