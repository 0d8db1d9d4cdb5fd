use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use tracing::{debug, instrument, warn};

use super::claims::Claims;
use crate::shared::AppError;

const DEFAULT_LIFETIME_DAYS: i64 = 30;
const DEV_SECRET: &str = "wordmines-dev-secret";

/// Signs and checks the bearer tokens that carry a player identity.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    lifetime: Duration,
}

impl TokenConfig {
    /// Reads `JWT_SECRET` and `TOKEN_EXPIRATION_DAYS`. A missing or
    /// non-positive lifetime falls back to 30 days.
    pub fn new() -> Self {
        let days = std::env::var("TOKEN_EXPIRATION_DAYS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_LIFETIME_DAYS);

        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, signing tokens with the development secret");
            DEV_SECRET.to_string()
        });

        Self::with_secret(secret, Duration::days(days))
    }

    pub fn with_secret(secret: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    /// Issues a token naming `identity` as its subject.
    #[instrument(skip(self))]
    pub fn create_token(&self, identity: &str) -> Result<String, AppError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(AppError::BadRequest("Identity cannot be empty".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: identity.to_string(),
            exp: (now + self.lifetime).timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::JwtError(e.to_string()))
    }

    /// Returns the claims of a well-signed, unexpired token with a
    /// non-empty subject. Every failure is an authentication failure.
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Self::validation(),
        )
        .map_err(|e| {
            debug!(error = %e, "Token rejected");
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
                _ => AppError::Unauthorized("Invalid token".to_string()),
            }
        })?
        .claims;

        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Token has no identity".to_string()));
        }
        Ok(claims)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}
