/// Delivery agent endpoints
///
/// # Endpoints
///
/// - `POST /api/delivery/register` - Register a delivery agent
/// - `POST /api/delivery/login` - Login as a delivery agent
///
/// Delivery agents live in their own table, so an email may be registered
/// both here and as a user.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thali_shared::{
    auth::credentials::RegisterDeliveryAgent,
    models::{delivery_agent::DeliveryAgent, role::Role},
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DeliveryRegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DeliveryLoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Delivery agent as echoed by login (never includes the password hash)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAgentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<DeliveryAgent> for DeliveryAgentSummary {
    fn from(agent: DeliveryAgent) -> Self {
        Self {
            id: agent.id,
            name: agent.name,
            email: agent.email,
            phone: agent.phone,
            role: Role::Delivery,
            created_at: agent.created_at,
        }
    }
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLoginResponse {
    pub token: String,

    pub delivery_boy: DeliveryAgentSummary,
}

/// `201 Created` with `{ "message": "Delivery boy registered successfully" }`
///
/// # Errors
///
/// - `400 Bad Request`: "Delivery boy already exists"
/// - `422 Unprocessable Entity`: Missing or empty field
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<DeliveryRegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;

    state
        .credentials
        .register_delivery_agent(RegisterDeliveryAgent {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Delivery boy registered successfully")),
    ))
}

/// Issues a token with role `delivery` and no email claim
///
/// # Errors
///
/// - `400 Bad Request`: "Invalid credentials"
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<DeliveryLoginRequest>,
) -> ApiResult<Json<DeliveryLoginResponse>> {
    req.validate()?;

    let agent: DeliveryAgent = state
        .credentials
        .authenticate(&req.email, &req.password, None)
        .await?;

    let token = state.tokens.issue(agent.id, None, Role::Delivery)?;

    debug!(delivery_agent_id = %agent.id, "Delivery agent logged in");

    Ok(Json(DeliveryLoginResponse {
        token,
        delivery_boy: agent.into(),
    }))
}
