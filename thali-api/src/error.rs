/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every failure is converted into an
/// [`ApiError`] and rendered as
///
/// ```json
/// { "error": "bad_request", "message": "User already exists" }
/// ```
///
/// Client mistakes (duplicate email, bad credentials, role mismatch) are
/// `400`s with a short message. Internal failures are logged and returned
/// as a generic `500`; driver error text never reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thali_shared::{
    auth::{
        authorization::AuthzError, credentials::CredentialError, jwt::JwtError,
        middleware::AuthError,
    },
    models::principal::PrincipalKind,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - no token presented
    Unauthorized(String),

    /// Forbidden (403) - bad token or wrong role
    Forbidden(String),

    /// Unprocessable entity (422) - missing or empty fields
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,

    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::InternalError(format!("Database error: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Conflict(kind) => ApiError::BadRequest(
                match kind {
                    PrincipalKind::User => "User already exists",
                    PrincipalKind::DeliveryAgent => "Delivery boy already exists",
                    PrincipalKind::Owner => "Owner already exists",
                }
                .to_string(),
            ),
            CredentialError::InvalidCredentials => {
                ApiError::BadRequest("Invalid credentials".to_string())
            }
            CredentialError::RoleMismatch { .. } => {
                ApiError::BadRequest("Access denied for this role".to_string())
            }
            CredentialError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            CredentialError::Database(e) => ApiError::from(e),
        }
    }
}

/// Token issuance failures; verification failures go through [`AuthError`]
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::InternalError(format!("Token operation failed: {}", err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Access token required".to_string())
            }
            AuthError::InvalidToken(_) => ApiError::Forbidden("Invalid token".to_string()),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthenticated => {
                ApiError::Unauthorized("Access token required".to_string())
            }
            AuthzError::InsufficientRole { .. } => {
                ApiError::Forbidden("Access denied for this role".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thali_shared::models::role::Role;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid credentials".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid credentials");
    }

    #[test]
    fn test_credential_errors_are_client_errors() {
        let cases = [
            (CredentialError::Conflict(PrincipalKind::User), "User already exists"),
            (
                CredentialError::Conflict(PrincipalKind::DeliveryAgent),
                "Delivery boy already exists",
            ),
            (CredentialError::InvalidCredentials, "Invalid credentials"),
            (
                CredentialError::RoleMismatch { expected: Role::Owner, actual: Role::User },
                "Access denied for this role",
            ),
        ];

        for (err, expected) in cases {
            match ApiError::from(err) {
                ApiError::BadRequest(msg) => assert_eq!(msg, expected),
                other => panic!("expected BadRequest, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "Server error");
        assert!(!body.to_string().contains("pool"));
    }

    #[tokio::test]
    async fn test_bad_request_body() {
        let response = ApiError::BadRequest("User already exists".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "User already exists");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_gate_errors_map_to_401_and_403() {
        assert!(matches!(
            ApiError::from(AuthError::MissingCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidToken("expired".to_string())),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(AuthzError::InsufficientRole { actual: Role::User }),
            ApiError::Forbidden(_)
        ));
    }
}
