use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Basic health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    status: &'static str,
    details: Option<Value>,
    #[serde(skip)]
    status_code: StatusCode,
}

impl IntoResponse for Health {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "status": self.status
        });

        if let Some(Value::Object(obj)) = self.details {
            for (key, value) in obj {
                body[key] = value;
            }
        }

        (self.status_code, Json(body)).into_response()
    }
}

/// Liveness: the process is serving requests
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = Health)
    )
)]
pub(crate) async fn health_check() -> Health {
    Health {
        status: "ok",
        details: None,
        status_code: StatusCode::OK,
    }
}

/// Readiness: cache and drink store both answer
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = Health),
        (status = 503, description = "Service is not ready", body = Health)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> Health {
    match state.health_check().await {
        Ok(()) => Health {
            status: "ok",
            details: Some(serde_json::json!({
                "cache": state.cache.kind(),
                "cache_status": "healthy",
                "store_status": "healthy"
            })),
            status_code: StatusCode::OK,
        },
        Err(message) => Health {
            status: "error",
            details: Some(serde_json::json!({
                "error": message
            })),
            status_code: StatusCode::SERVICE_UNAVAILABLE,
        },
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}

#[cfg(test)]
mod test {
    use crate::cache::{null::NullCache, Cache};
    use crate::config::AppConfig;
    use crate::state::AppState;
    use crate::store::{sqlite::SqliteDrinkStore, DrinkStore};
    use crate::test_utils::TestFixture;
    use http::StatusCode;
    use serde_json::json;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_health_endpoint() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/health", None).await;
        response.assert_ok();
        assert_eq!(response.json, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/ready", None).await;
        response.assert_ok();
        assert_eq!(
            response.json,
            json!({
                "status": "ok",
                "cache": "none",
                "cache_status": "healthy",
                "store_status": "healthy"
            })
        );
    }

    #[tokio::test]
    async fn test_ready_names_failing_store() {
        let jwks_mock = MockServer::start().await;
        let config = AppConfig::for_test_with_mocks(&jwks_mock);

        let sqlite = SqliteDrinkStore::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite");
        sqlite.close().await;
        let state = AppState::new(config, Cache::Null(NullCache::new()), DrinkStore::Sqlite(sqlite))
            .expect("Failed to build state");

        let fixture = TestFixture::with_state(jwks_mock, state).await;
        let response = fixture.get("/ready", None).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json["status"], "error");

        let error = response.json["error"].as_str().expect("error is a string");
        assert!(error.starts_with("store: "), "unexpected error: {error}");
        assert!(!error.contains("cache"), "cache is healthy: {error}");
    }
}
