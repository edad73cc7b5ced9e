/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use thali_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, MethodRouter},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use thali_shared::{
    auth::{
        authorization::require_role_opt,
        credentials::CredentialStore,
        jwt::TokenIssuer,
        middleware::{token_gate, AuthContext},
    },
    models::role::Role,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Signs and verifies bearer tokens with the configured secret
    pub tokens: TokenIssuer,

    pub credentials: CredentialStore,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            tokens: TokenIssuer::new(&config.jwt.secret),
            credentials: CredentialStore::new(db.clone()),
            config: Arc::new(config),
            db,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// GET  /                        plain-text banner
/// GET  /health                  health check
/// POST /register                user registration
/// POST /login                   user login
/// POST /api/delivery/register   delivery agent registration
/// POST /api/delivery/login      delivery agent login
/// POST /owner/login             owner login
/// GET  /products                list catalog
/// POST /products                add product        (gated when protected)
/// POST /add-sample-products     seed sample menu   (gated when protected)
/// ```
pub fn build_router(state: AppState) -> Router {
    let protect = state.config.api.protect_catalog_writes;

    let create_product = catalog_write(post(routes::products::create_product), &state.tokens, protect);
    let add_samples = catalog_write(post(routes::products::add_sample_products), &state.tokens, protect);

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/api/delivery/register", post(routes::delivery::register))
        .route("/api/delivery/login", post(routes::delivery::login))
        .route("/owner/login", post(routes::owner::login))
        .route("/products", get(routes::products::list_products).merge(create_product))
        .route("/add-sample-products", add_samples)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Puts a catalog write behind the token gate and the owner check
fn catalog_write(
    route: MethodRouter<AppState>,
    tokens: &TokenIssuer,
    protect: bool,
) -> MethodRouter<AppState> {
    if !protect {
        return route;
    }

    // Layers run outermost-last: the gate runs first, then the role check.
    route
        .route_layer(middleware::from_fn(owner_only))
        .route_layer(middleware::from_fn_with_state(tokens.clone(), token_gate))
}

async fn owner_only(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role_opt(req.extensions().get::<AuthContext>(), &[Role::Owner])?;
    Ok(next.run(req).await)
}
