/// Token gate middleware for Axum
///
/// Validates `Authorization: Bearer <token>` and, on success, places an
/// [`AuthContext`] with the decoded claims into the request extensions for
/// downstream handlers and role checks.
///
/// # Failure Semantics
///
/// - No header, or no token after the scheme → `401 Unauthorized`
/// - Token present but bad signature, malformed, foreign issuer or expired
///   → `403 Forbidden`
///
/// The gate is not attached anywhere by default; routers opt into it.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use thali_shared::auth::jwt::TokenIssuer;
/// use thali_shared::auth::middleware::{token_gate, AuthContext};
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("{} ({})", auth.principal_id, auth.role)
/// }
///
/// let issuer = TokenIssuer::new("secret-key-at-least-32-bytes-long!!");
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(issuer, token_gate));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{Claims, JwtError, TokenIssuer};
use crate::models::role::Role;

/// Authenticated principal, available to handlers behind the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub principal_id: Uuid,

    /// Only present for tokens that carried an email claim
    pub email: Option<String>,

    pub role: Role,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            principal_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Error type for the token gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was presented
    #[error("Access token required")]
    MissingCredentials,

    /// A token was presented but did not verify
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "unauthorized", "Access token required"),
            AuthError::InvalidToken(_) => (StatusCode::FORBIDDEN, "forbidden", "Invalid token"),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}

/// Pulls the token out of a `Bearer <token>` authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::MissingCredentials),
    }
}

/// Verifies the bearer token and attaches [`AuthContext`]
///
/// Use with `axum::middleware::from_fn_with_state(issuer, token_gate)`.
pub async fn token_gate(
    State(issuer): State<TokenIssuer>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;

    let claims = issuer.verify(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        AuthError::from(e)
    })?;

    req.extensions_mut().insert(AuthContext::from(claims));

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}
