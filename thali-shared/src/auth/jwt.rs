/// JWT issuance and verification
///
/// Tokens are HS256-signed claim sets asserting a principal's identity and
/// role. They live for 24 hours and are verified statelessly: there is no
/// revocation list and no refresh flow, so a token stays valid until it
/// expires regardless of later account changes.
///
/// The signing secret is injected once at startup into a [`TokenIssuer`],
/// which the application state then shares across requests.
///
/// # Example
///
/// ```
/// use thali_shared::auth::jwt::TokenIssuer;
/// use thali_shared::models::role::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("test-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
///
/// let token = issuer.issue(user_id, Some("a@x.com".to_string()), Role::User)?;
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.role, Role::User);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::role::Role;

/// Value of the `iss` claim on every token
pub const TOKEN_ISSUER: &str = "thali";

/// Lifetime of an issued token
pub fn token_lifetime() -> Duration {
    Duration::hours(24)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature check or claim decoding failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token is not a well-formed JWT
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token's not-before time lies in the future
    #[error("Token is not valid yet")]
    NotYetValid,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Claim set carried by every token
///
/// # Standard Claims
///
/// - `sub`: Principal ID
/// - `iss`: Always "thali"
/// - `iat` / `nbf`: Issue time (Unix seconds)
/// - `exp`: Issue time + 24h (Unix seconds)
///
/// # Custom Claims
///
/// - `email`: Present for user and owner logins
/// - `role`: Principal role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub role: Role,

    pub iss: String,

    pub iat: i64,

    pub nbf: i64,

    pub exp: i64,
}

impl Claims {
    /// Builds claims issued at `now` with the standard lifetime
    pub fn issued_at(subject: Uuid, email: Option<String>, role: Role, now: DateTime<Utc>) -> Self {
        let expiration = now + token_lifetime();

        Self {
            sub: subject,
            email,
            role,
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Whether the token is expired at `now`
    ///
    /// The expiry instant itself is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Signs and verifies tokens with one process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer from the shared HS256 secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token for `subject` valid for the next 24 hours
    pub fn issue(&self, subject: Uuid, email: Option<String>, role: Role) -> Result<String, JwtError> {
        self.issue_at(subject, email, role, Utc::now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: Uuid,
        email: Option<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::issued_at(subject, email, role, now);
        self.sign(&claims)
    }

    /// Signs an arbitrary claim set
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token against the current time
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies signature, issuer and validity window at `now`
    ///
    /// The time checks use `now` with no leeway: a token is rejected from
    /// its `exp` second onwards.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            ErrorKind::InvalidToken => JwtError::InvalidFormat(e.to_string()),
            _ => JwtError::ValidationError(e.to_string()),
        })?;

        let claims = token_data.claims;

        if claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }

        if now.timestamp() < claims.nbf {
            return Err(JwtError::NotYetValid);
        }

        Ok(claims)
    }
}
