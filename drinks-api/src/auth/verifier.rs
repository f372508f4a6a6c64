use super::{AuthError, Claims};
use crate::cache::{Cache, CacheBackend};
use crate::config::AuthConfig;
use http::StatusCode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use log::{debug, info, warn};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reasons a token can fail verification
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Key set unavailable: {0}")]
    KeySetUnavailable(String),
    #[error("Token header could not be parsed: {0}")]
    MalformedHeader(String),
    #[error("Token is missing the 'kid' header")]
    MissingKid,
    #[error("No key found for kid '{0}'")]
    KeyNotFound(String),
    #[error("Invalid JWK: {0}")]
    InvalidKey(String),
    #[error("Token expired")]
    Expired,
    #[error("Incorrect claims: {0}")]
    InvalidClaims(String),
    #[error("Token could not be verified: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => VerifyError::InvalidClaims(e.to_string()),
            _ => VerifyError::Invalid(e.to_string()),
        }
    }
}

impl From<VerifyError> for AuthError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::KeySetUnavailable(_) => AuthError::jwks_unavailable(),
            VerifyError::MissingKid => {
                AuthError::invalid_header("Authorization malformed.", StatusCode::UNAUTHORIZED)
            }
            VerifyError::KeyNotFound(_) => AuthError::invalid_header(
                "Unable to find the appropriate key.",
                StatusCode::BAD_REQUEST,
            ),
            VerifyError::Expired => AuthError::token_expired(),
            VerifyError::InvalidClaims(_) => AuthError::invalid_claims(
                "Incorrect claims. Please, check the audience and issuer.",
                StatusCode::UNAUTHORIZED,
            ),
            VerifyError::MalformedHeader(_) | VerifyError::InvalidKey(_) | VerifyError::Invalid(_) => {
                AuthError::invalid_header(
                    "Unable to parse authentication token.",
                    StatusCode::BAD_REQUEST,
                )
            }
        }
    }
}

/// Verifies bearer tokens against the issuer's published key set.
///
/// Key sets are kept in the configured cache; when a token names a key id
/// the cached set does not contain, the set is fetched again once so that
/// rotated keys are picked up.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks_url: String,
    validation: Validation,
    client: Client,
    cache: Arc<Cache>,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, cache: Arc<Cache>) -> Result<Self, String> {
        let jwks_url = config.jwks_url();
        Url::parse(&jwks_url).map_err(|e| format!("Invalid key set URL '{jwks_url}': {e}"))?;

        let algorithms = config.algorithms()?;
        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms;
        validation.set_audience(&[&config.audience]);
        validation.set_issuer(&[config.issuer()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Ok(Self {
            jwks_url,
            validation,
            client: Self::create_jwks_client(config.jwks_timeout)?,
            cache,
        })
    }

    fn create_jwks_client(timeout_secs: u64) -> Result<Client, String> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(2)))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| format!("Failed to create key set client: {e}"))
    }

    /// Location the key set is fetched from
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Verifies signature, algorithm, audience, issuer and expiry, returning the claims
    pub async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = decode_header(token).map_err(|e| VerifyError::MalformedHeader(e.to_string()))?;
        let kid = header.kid.ok_or(VerifyError::MissingKid)?;
        debug!("Verifying token signed with kid '{}' ({:?})", kid, header.alg);

        let jwk = self.find_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|e| VerifyError::InvalidKey(e.to_string()))?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            warn!("Token verification failed: {}", e);
            VerifyError::from(e)
        })?;
        Ok(data.claims)
    }

    async fn find_key(&self, kid: &str) -> Result<Jwk, VerifyError> {
        if let Some(key_set) = self.cached_key_set().await {
            if let Some(jwk) = key_set.find(kid) {
                return Ok(jwk.clone());
            }
            debug!("Key '{}' missing from cached key set, refreshing", kid);
        }

        let key_set = self.refresh_key_set().await?;
        key_set
            .find(kid)
            .cloned()
            .ok_or_else(|| VerifyError::KeyNotFound(kid.to_string()))
    }

    fn cache_key(&self) -> String {
        format!("jwks:{}", self.jwks_url)
    }

    async fn cached_key_set(&self) -> Option<JwkSet> {
        match self.cache.get::<JwkSet>(&self.cache_key()).await {
            Ok(key_set) => key_set,
            Err(e) => {
                warn!("Ignoring unreadable cached key set: {}", e);
                None
            }
        }
    }

    /// Fetches the key set from the issuer and stores it in the cache
    pub async fn refresh_key_set(&self) -> Result<JwkSet, VerifyError> {
        let key_set = self.fetch_key_set().await?;
        if let Err(e) = self.cache.set(&self.cache_key(), &key_set).await {
            warn!("Failed to cache key set: {}", e);
        }
        info!(
            "Loaded {} signing keys from {}",
            key_set.keys.len(),
            self.jwks_url
        );
        Ok(key_set)
    }

    async fn fetch_key_set(&self) -> Result<JwkSet, VerifyError> {
        debug!("Fetching key set from {}", self.jwks_url);

        let response = self.client.get(&self.jwks_url).send().await.map_err(|e| {
            VerifyError::KeySetUnavailable(format!(
                "Failed to fetch key set from '{}': {}",
                self.jwks_url, e
            ))
        })?;

        if !response.status().is_success() {
            return Err(VerifyError::KeySetUnavailable(format!(
                "Key set request to '{}' returned status {}",
                self.jwks_url,
                response.status()
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            VerifyError::KeySetUnavailable(format!("Failed to read key set body: {e}"))
        })?;
        serde_json::from_slice(&body).map_err(|e| {
            VerifyError::KeySetUnavailable(format!(
                "Failed to parse key set from '{}': {}",
                self.jwks_url, e
            ))
        })
    }
}
