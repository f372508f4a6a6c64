use crate::auth::Claims;
use crate::errors::{ApiError, ErrorResponse};
use crate::models::DeleteResponse;
use crate::openapi::DRINKS_TAG;
use crate::state::AppState;
use crate::store::DrinkRepository;
use axum::extract::rejection::PathRejection;
use axum::extract::{Extension, Json, Path, State};
use log::info;

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    tag = DRINKS_TAG,
    params(
        ("id" = i64, Path, description = "Drink identifier"),
        ("Authorization" = String, Header, description = "Bearer token with delete:drinks"),
    ),
    responses(
        (status = 200, description = "Identifier of the removed drink", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Permission not granted", body = ErrorResponse),
        (status = 404, description = "No drink with this id", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(id) = id?;

    state.store.delete(id).await?;
    info!("'{}' deleted drink {}", claims.sub, id);

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
