use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the email of the user it was issued to.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing secret and lifetime for access tokens.
///
/// Shared with handlers and `AuthMiddleware` as `web::Data<TokenSettings>`.
#[derive(Clone)]
pub struct TokenSettings {
    secret: String,
    ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Issues a signed HS256 token bound to `email`, valid for the configured lifetime.
///
/// # Returns
/// Returns `AppError::InternalServerError` if the lifetime overflows or encoding fails.
pub fn generate_token(email: &str, settings: &TokenSettings) -> Result<String, AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(settings.ttl)
        .ok_or_else(|| AppError::InternalServerError("Token lifetime out of range".into()))?;

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies the signature and expiry of a token and decodes its claims.
///
/// # Returns
/// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid,
/// or it has expired.
pub fn verify_token(token: &str, settings: &TokenSettings) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
