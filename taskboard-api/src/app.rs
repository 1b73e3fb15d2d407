/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                      # API banner (public)
/// ├── GET  /health                # Health check (public)
/// ├── /auth/
/// │   ├── POST /login             # Login (public)
/// │   └── GET  /me                # Current user (bearer token)
/// ├── /users/                     # POST admin-only; GET any; DELETE admin-only
/// ├── /projects/                  # POST/GET any; DELETE admin-only
/// ├── /tasks/                     # POST/GET/PATCH per policy; DELETE admin-only
/// │   └── GET /:id/activity
/// └── GET  /dashboard
/// ```
///
/// Everything except `/`, `/health`, and `/auth/login` sits behind the JWT
/// middleware, which rejects unauthenticated requests with 401 before any
/// handler or policy code runs.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::{jwt, principal::CurrentUser};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes, no auth
    let public_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login));

    // Everything else requires a valid bearer token
    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/users", post(routes::users::create_user))
        .route("/users", get(routes::users::list_users))
        .route("/users/:id", delete(routes::users::delete_user))
        .route("/projects", post(routes::projects::create_project))
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects/:id", delete(routes::projects::delete_project))
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route("/tasks/:id", patch(routes::tasks::update_task))
        .route("/tasks/:id", delete(routes::tasks::delete_task))
        .route("/tasks/:id/activity", get(routes::tasks::get_task_activity))
        .route("/dashboard", get(routes::dashboard::get_summary))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects the authenticated principal into request extensions. Every
/// failure mode (missing header, malformed header, bad signature, expired
/// token) is a 401; authorization decisions happen later, in handlers.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::Unauthorized("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let current_user = CurrentUser::from_claims(&claims);
    req.extensions_mut().insert(current_user);

    Ok(next.run(req).await)
}
