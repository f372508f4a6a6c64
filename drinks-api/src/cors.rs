use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use log::warn;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Cross-origin policy for the configured origin
pub fn cors_layer(origin: &str) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin(origin))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// `*` allows any origin, anything else must be a single valid header value
fn allow_origin(origin: &str) -> AllowOrigin {
    if origin.trim() == "*" {
        return AllowOrigin::any();
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{}': {}, allowing any", origin, e);
            AllowOrigin::any()
        }
    }
}
