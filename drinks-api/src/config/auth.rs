//! Token verification configuration

use confique::Config;
use jsonwebtoken::Algorithm;
use std::str::FromStr;

/// Settings for verifying bearer tokens issued by the identity provider
#[derive(Debug, Config, Clone)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `coffee-shop.eu.auth0.com`
    #[config(env = "COFFEE_AUTH_DOMAIN")]
    pub domain: String,

    /// Audience every accepted token must be issued for
    #[config(env = "COFFEE_AUTH_AUDIENCE")]
    pub audience: String,

    /// Accepted signing algorithms, comma separated (default: RS256)
    #[config(env = "COFFEE_AUTH_ALGORITHMS", default = "RS256")]
    pub algorithms: String,

    /// Overrides the key set location derived from the domain
    #[config(env = "COFFEE_AUTH_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// Overrides the expected issuer derived from the domain
    #[config(env = "COFFEE_AUTH_ISSUER")]
    pub issuer: Option<String>,

    /// Timeout for key set requests in seconds (default: 5)
    #[config(env = "COFFEE_AUTH_JWKS_TIMEOUT", default = 5)]
    pub jwks_timeout: u64,
}

impl AuthConfig {
    /// Location of the issuer's published key set
    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!("https://{}/.well-known/jwks.json", self.domain),
        }
    }

    /// The `iss` value tokens must carry
    pub fn issuer(&self) -> String {
        match &self.issuer {
            Some(issuer) => issuer.clone(),
            None => format!("https://{}/", self.domain),
        }
    }

    /// Parses the configured algorithm list
    pub fn algorithms(&self) -> Result<Vec<Algorithm>, String> {
        let algorithms = self
            .algorithms
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Algorithm::from_str(s).map_err(|_| format!("Unknown signing algorithm '{s}'")))
            .collect::<Result<Vec<_>, _>>()?;

        if algorithms.is_empty() {
            return Err("At least one signing algorithm must be configured".to_string());
        }
        Ok(algorithms)
    }
}
