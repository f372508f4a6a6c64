use crate::auth::Claims;
use crate::errors::{ApiError, ErrorResponse};
use crate::models::{Drink, DrinksResponse, ShortDrinksResponse};
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use crate::store::DrinkRepository;
use axum::extract::{Extension, Json, State};

/// Public drink menu, recipes reduced to colors and parts
#[utoipa::path(
    get,
    path = "/drinks",
    tag = DRINKS_TAG,
    responses(
        (status = 200, description = "Every drink in short form, ordered by id", body = ShortDrinksResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<ShortDrinksResponse>, ApiError> {
    let drinks = state.store.list().await?;
    Ok(Json(ShortDrinksResponse {
        success: true,
        drinks: drinks.iter().map(Drink::short).collect(),
    }))
}

/// Drinks with their complete recipes
#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = DRINKS_TAG,
    params(
        ("Authorization" = String, Header, description = "Bearer token with get:drinks-detail"),
    ),
    responses(
        (status = 200, description = "Every drink in long form, ordered by id", body = DrinksResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission not granted", body = ErrorResponse)
    )
)]
pub(crate) async fn list_drinks_detail(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DrinksResponse>, ApiError> {
    log::debug!("Listing drink details for '{}'", claims.sub);
    let drinks = state.store.list().await?;
    Ok(Json(DrinksResponse {
        success: true,
        drinks,
    }))
}
