/// Owner login
///
/// There is no owner registration. The configured bootstrap pair
/// (`OWNER_EMAIL` / `OWNER_PASSWORD`) is the only accepted input; the owner
/// row is created on the first successful login and reused afterwards.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::{LoginResponse, PrincipalSummary},
};
use axum::{extract::State, Json};
use serde::Deserialize;
use thali_shared::models::role::Role;
use tracing::{debug, warn};
use validator::Validate;

const INVALID_OWNER_CREDENTIALS: &str = "Invalid owner credentials";

/// Owner login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct OwnerLoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /owner/login`
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "Owner", "email": "am@gmail.com", "role": "owner" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: "Invalid owner credentials" for any other pair, even
///   one matching a stored owner row
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<OwnerLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    if !state.config.owner.matches(&req.email, &req.password) {
        warn!("Owner login rejected");
        return Err(ApiError::BadRequest(INVALID_OWNER_CREDENTIALS.to_string()));
    }

    let owner = state.credentials.ensure_owner(&req.email, &req.password).await?;
    let token = state
        .tokens
        .issue(owner.id, Some(owner.email.clone()), Role::Owner)?;

    debug!(owner_id = %owner.id, "Owner logged in");

    Ok(Json(LoginResponse {
        token,
        user: PrincipalSummary {
            id: owner.id,
            username: owner.username,
            email: owner.email,
            role: Role::Owner,
        },
    }))
}
