/// User authentication endpoints
///
/// # Endpoints
///
/// - `POST /register` - Register a user (role defaults to `user`)
/// - `POST /login` - Login, optionally asserting the expected role
///
/// Both accept any non-empty values; there is no email format or password
/// strength check.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use thali_shared::{
    auth::credentials::RegisterUser,
    models::{
        role::{Role, UnknownRole},
        user::User,
    },
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

pub(crate) const ACCESS_DENIED: &str = "Access denied for this role";

/// Register request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// One of `user`, `delivery`, `owner`; empty or absent means `user`
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// When set, login fails unless the stored role matches
    pub role: Option<String>,
}

/// Public view of an authenticated principal
#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for PrincipalSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token valid for 24 hours
    pub token: String,

    pub user: PrincipalSummary,
}

/// Parses an optional role field, treating an empty string as absent
///
/// On `/register` an unknown role is a bad input ("Invalid role"). On
/// `/login` it can never equal the stored role, so it is reported as a role
/// mismatch once the password has been checked.
pub(crate) fn optional_role(raw: Option<&str>) -> Result<Option<Role>, UnknownRole> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// { "username": "a", "email": "a@x.com", "password": "p1" }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "message": "User created successfully" }`
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered, or unknown role
/// - `422 Unprocessable Entity`: Missing or empty field
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;

    let role = optional_role(req.role.as_deref())
        .map_err(|e| ApiError::BadRequest(format!("Invalid role: {}", e.0)))?;

    state
        .credentials
        .register_user(RegisterUser {
            username: req.username,
            email: req.email,
            password: req.password,
            role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// { "email": "a@x.com", "password": "p1", "role": "user" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "a", "email": "a@x.com", "role": "user" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: "Invalid credentials" or "Access denied for this role"
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    // Password is checked before the role, so an unknown role still reports
    // bad credentials first.
    let expected_role = optional_role(req.role.as_deref());

    let user: User = state
        .credentials
        .authenticate(&req.email, &req.password, expected_role.clone().unwrap_or(None))
        .await?;

    if let Err(unknown) = expected_role {
        debug!(user_id = %user.id, requested = %unknown.0, "Login with unknown role");
        return Err(ApiError::BadRequest(ACCESS_DENIED.to_string()));
    }

    let token = state
        .tokens
        .issue(user.id, Some(user.email.clone()), user.role)?;

    debug!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: PrincipalSummary::from(&user),
    }))
}
