mod api;
mod auth;
mod cache;
mod config;
mod cors;
mod errors;
mod models;
mod openapi;
mod state;
mod store;
#[cfg(test)]
mod test_utils;

use crate::cors::cors_layer;
use crate::errors::{method_not_allowed_fallback, not_found_fallback};
use crate::state::AppState;
use axum::Router;
use log::{error, info};
use std::net::SocketAddr;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[tokio::main]
async fn main() {
    // Values from .env never override the real environment
    dotenv::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load configuration
    let config = match config::AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    let port = config.port;

    // Cache, drink store and token verifier
    let state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Verifying tokens against {} ({} key set cache)",
        state.verifier.jwks_url(),
        state.cache.kind()
    );

    let app = create_app(state).await;

    // Build server address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let server = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server running on {}, press Ctrl+C to stop", addr);
    let serve = axum::serve(server, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = serve {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Create a new application instance with a given state
pub async fn create_app(state: AppState) -> Router {
    // Create OpenAPI documentation
    let (openapi_router, api_doc) =
        OpenApiRouter::with_openapi(openapi::ApiDoc::openapi()).split_for_parts();
    let cors = cors_layer(&state.config.cors_allow_origin);

    // Only matched routes answer preflight, unknown paths still reach the fallback
    Router::new()
        .merge(api::router(&state))
        .merge(openapi_router)
        .merge(Scalar::with_url("/scalar", api_doc))
        .method_not_allowed_fallback(method_not_allowed_fallback)
        .route_layer(cors)
        .fallback(not_found_fallback)
        .with_state(state)
}

// Simple signal handler that works on all platforms
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, CacheStore};
    use crate::test_utils::{claims_with_permissions, jwks_body, mint_token, TestFixture};
    use axum::body::Body;
    use http::header::{
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD,
        ORIGIN,
    };
    use http::{Method, StatusCode};
    use serde_json::json;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let fixture = TestFixture::new().await;

        let response = fixture.get("/teas", None).await;
        response.assert_error(StatusCode::NOT_FOUND, None);
        assert_eq!(response.json["message"], "Not found");

        let request = fixture
            .request_builder(Method::PUT, "/drinks", None)
            .body(Body::empty())
            .expect("Failed to build request");
        let response = fixture.send(request).await;
        response.assert_error(StatusCode::METHOD_NOT_ALLOWED, None);
        assert_eq!(response.json["message"], "method not allowed");
    }

    #[tokio::test]
    async fn test_cors_headers_and_preflight() {
        let fixture = TestFixture::new().await;

        let response = fixture.get("/drinks", None).await;
        assert_eq!(response.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        // Error responses carry the headers too
        let response = fixture.get("/drinks-detail", None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let request = fixture
            .request_builder(Method::OPTIONS, "/drinks/1", None)
            .header(ORIGIN, "https://menu.coffee-shop.test")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .body(Body::empty())
            .expect("Failed to build request");
        let response = fixture.send(request).await;
        assert!(response.status.is_success());
        let methods = response.headers[ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .expect("ASCII header");
        assert!(methods.contains("DELETE"));
        assert!(methods.contains("PATCH"));
    }

    #[tokio::test]
    async fn test_preflight_to_unknown_path_is_not_found() {
        let fixture = TestFixture::new().await;

        let request = fixture
            .request_builder(Method::OPTIONS, "/no-such-route", None)
            .header(ORIGIN, "https://menu.coffee-shop.test")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .expect("Failed to build request");
        let response = fixture.send(request).await;
        response.assert_error(StatusCode::NOT_FOUND, None);
        assert!(response.headers.get(ACCESS_CONTROL_ALLOW_METHODS).is_none());
    }

    #[tokio::test]
    async fn test_crud_walkthrough() {
        let fixture = TestFixture::new().await;
        let token = fixture.token(&[
            "get:drinks-detail",
            "post:drinks",
            "patch:drinks",
            "delete:drinks",
        ]);

        let created = fixture
            .post(
                "/drinks",
                Some(&token),
                &json!({"title": "cappuccino", "recipe": [{"color": "brown", "name": "espresso", "parts": 1}]}),
            )
            .await;
        created.assert_ok();
        let id = created.json["drinks"][0]["id"].as_i64().expect("id is an integer");

        fixture
            .patch(format!("/drinks/{id}"), Some(&token), &json!({"title": "flat white"}))
            .await
            .assert_ok();

        let menu = fixture.get("/drinks", None).await;
        assert_eq!(menu.json["drinks"][0]["title"], "flat white");
        assert!(menu.json["drinks"][0]["recipe"][0].get("name").is_none());

        fixture
            .delete(format!("/drinks/{id}"), Some(&token))
            .await
            .assert_ok();
        let detail = fixture.get("/drinks-detail", Some(&token)).await;
        assert_eq!(detail.json, json!({"success": true, "drinks": []}));
    }

    #[tokio::test]
    async fn test_expired_and_foreign_tokens() {
        let fixture = TestFixture::new().await;

        let mut expired = claims_with_permissions(&["get:drinks-detail"]);
        expired["exp"] = json!(1_000_000);
        fixture
            .get("/drinks-detail", Some(&mint_token(&expired)))
            .await
            .assert_error(StatusCode::UNAUTHORIZED, Some("token_expired"));

        let mut foreign = claims_with_permissions(&["get:drinks-detail"]);
        foreign["aud"] = json!("payments");
        fixture
            .get("/drinks-detail", Some(&mint_token(&foreign)))
            .await
            .assert_error(StatusCode::UNAUTHORIZED, Some("invalid_claims"));

        fixture
            .get("/drinks-detail", Some("not.a.token"))
            .await
            .assert_error(StatusCode::BAD_REQUEST, Some("invalid_header"));
    }

    #[tokio::test]
    async fn test_issuer_unreachable() {
        let fixture = TestFixture::without_keys().await;
        fixture
            .mount_jwks(json!({"error": "down"}), StatusCode::SERVICE_UNAVAILABLE, Some(1))
            .await;

        let token = fixture.token(&["get:drinks-detail"]);
        fixture
            .get("/drinks-detail", Some(&token))
            .await
            .assert_error(StatusCode::BAD_GATEWAY, Some("jwks_unavailable"));
    }

    #[tokio::test]
    async fn test_key_set_cached_between_requests() {
        let jwks_mock = MockServer::start().await;
        let mut config = AppConfig::for_test_with_mocks(&jwks_mock);
        config.cache.store = CacheStore::InMemory;

        let fixture = TestFixture::with_config(jwks_mock, config).await;
        fixture.mount_jwks(jwks_body(), StatusCode::OK, Some(1)).await;

        let token = fixture.token(&["get:drinks-detail"]);
        for _ in 0..3 {
            fixture.get("/drinks-detail", Some(&token)).await.assert_ok();
        }
    }
}
