mod credentials;
pub use credentials::*;

use std::collections::HashSet;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::SecuritySettings;

pub const SCOPE_READ: &str = "blueprints.read";
pub const SCOPE_WRITE: &str = "blueprints.write";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Space separated scope list.
    pub scope: String,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub scopes: HashSet<String>,
}

impl Principal {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

impl From<Claims> for Principal {
    fn from(value: Claims) -> Self {
        Self {
            subject: value.sub,
            scopes: value.scope.split_whitespace().map(str::to_owned).collect(),
        }
    }
}

/// Signs and verifies HS256 access tokens. The signing secret is generated per
/// process, so tokens do not outlive a restart.
pub struct TokenIssuer {
    issuer: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(settings: &SecuritySettings) -> Self {
        let secret: [u8; 32] = rand::random();
        Self::with_secret(settings, &secret)
    }

    pub fn with_secret(settings: &SecuritySettings, secret: &[u8]) -> Self {
        Self {
            issuer: settings.issuer.clone(),
            ttl_seconds: settings.token_ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, subject: &str) -> jsonwebtoken::errors::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
            scope: format!("{} {}", SCOPE_READ, SCOPE_WRITE),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Principal> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims.into())
    }
}
