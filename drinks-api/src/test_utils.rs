use crate::config::AppConfig;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::LevelFilter;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Key id published for the test signing key
pub const TEST_KID: &str = "coffee-shop-test-key";

/// Private half of the key published by [`jwks_body`]
pub const SIGNING_KEY_PEM: &[u8] = include_bytes!("../testdata/signing_key.pem");

/// A key the issuer never published
pub const ROGUE_KEY_PEM: &[u8] = include_bytes!("../testdata/rogue_key.pem");

const TEST_KEY_MODULUS: &str = "yxVp0V0iRsTdUA--rZuHWl2zhMPllM7ODI_NrLV6szqkYb-stG-KR8quebnR0r2GsYP92G3r55zucjb5icJrsp5kuU6MgtqWbXH8mEVnu9JdWMy9h3OjlieOM1B0RcNSEdXtZLaa-ui_TiA_Dem--sr4DMgm1wDrilU3y6d2K-GrFLwurs2GDAN-NIf4WN1PzYAdK0Y71ZVYKPU92si8uI9F9W4vLO2TOXFO2T9cDwayvmZobRwenTqT6kMLoy2_7Rokkqei7oFBwq68gK-lXsI40iydBJ8WHoLiuSLZofHK_5p0Q2nDToey1NDwcTysUKJ9UZJqFw1qx6dGwzkmcw";

pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Key set document listing the public half of [`SIGNING_KEY_PEM`]
pub fn jwks_body() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": TEST_KID,
            "use": "sig",
            "alg": "RS256",
            "n": TEST_KEY_MODULUS,
            "e": "AQAB"
        }]
    })
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_secs()
}

/// Claims accepted by the test configuration, valid for an hour
pub fn claims_with_permissions(permissions: &[&str]) -> Value {
    let now = unix_now();
    json!({
        "sub": "auth0|barista",
        "iss": "https://coffee-shop.test/",
        "aud": "drinks",
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// Signs `claims` with the published test key
pub fn mint_token(claims: &Value) -> String {
    mint_token_with_key(Some(TEST_KID), SIGNING_KEY_PEM, claims)
}

/// Signs `claims` with RS256 using an arbitrary key and key id
pub fn mint_token_with_key<T: Serialize>(kid: Option<&str>, pem: &[u8], claims: &T) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem).expect("Invalid test key");
    encode(&header, claims, &key).expect("Failed to sign test token")
}

/// Test fixture running the whole application against a mocked issuer.
///
/// The issuer's key set endpoint is served by `jwks_mock` and the drinks live
/// in an in-memory store, so every test starts from an empty table.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     let token = fixture.token(&["post:drinks"]);
///
///     let response = fixture
///         .post("/drinks", Some(&token), &json!({"title": "latte", "recipe": []}))
///         .await;
///     response.assert_status(StatusCode::BAD_REQUEST);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Shared state, for seeding the store directly
    pub state: AppState,
    /// Mock server standing in for the token issuer
    pub jwks_mock: MockServer,
}

impl TestFixture {
    /// Creates a fixture whose issuer publishes the test signing key
    pub async fn new() -> Self {
        let fixture = Self::without_keys().await;
        fixture.mount_jwks(jwks_body(), StatusCode::OK, None).await;
        fixture
    }

    /// Creates a fixture whose issuer has no key set mounted yet
    pub async fn without_keys() -> Self {
        let jwks_mock = MockServer::start().await;
        let config = AppConfig::for_test_with_mocks(&jwks_mock);
        Self::with_config(jwks_mock, config).await
    }

    /// Creates a fixture from an adjusted configuration
    pub async fn with_config(jwks_mock: MockServer, config: AppConfig) -> Self {
        let state = AppState::for_testing(&config).await;
        Self::with_state(jwks_mock, state).await
    }

    /// Creates a fixture around prebuilt state, for swapping in a specific backend
    pub async fn with_state(jwks_mock: MockServer, state: AppState) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let app = create_app(state.clone()).await;

        Self {
            app,
            state,
            jwks_mock,
        }
    }

    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Serves `body` from the key set endpoint, optionally checking the number of fetches
    pub async fn mount_jwks(&self, body: Value, status_code: StatusCode, expected_calls: Option<u64>) {
        let mut mock = Mock::given(matchers::method("GET"))
            .and(matchers::path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(body));
        if let Some(calls) = expected_calls {
            mock = mock.expect(calls);
        }
        mock.mount(&self.jwks_mock).await;
    }

    /// A valid token granting `permissions`
    pub fn token(&self, permissions: &[&str]) -> String {
        mint_token(&claims_with_permissions(permissions))
    }

    /// Creates a request builder, adding the bearer token when given
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri.as_ref());
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.header("Content-Type", "application/json")
    }

    pub async fn get(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        token: Option<&str>,
        body: &T,
    ) -> TestResponse {
        self.send_json(Method::POST, uri, token, body).await
    }

    pub async fn patch<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        token: Option<&str>,
        body: &T,
    ) -> TestResponse {
        self.send_json(Method::PATCH, uri, token, body).await
    }

    pub async fn delete(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::DELETE, uri, token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    async fn send_json<T: Serialize>(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
        body: &T,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(method, uri, token)
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Sends a request and collects status, headers and JSON body
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| json!({}))
        } else {
            json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Asserts the error envelope, `code` included when given
    pub fn assert_error(&self, status: StatusCode, code: Option<&str>) -> &Self {
        self.assert_status(status);
        assert_eq!(self.json["success"], json!(false));
        assert_eq!(self.json["error"], json!(status.as_u16()));
        if let Some(code) = code {
            assert_eq!(self.json["code"], json!(code), "body: {}", self.json);
        }
        self
    }
}
