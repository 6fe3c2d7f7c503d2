//! HTTP route handlers for the accounts API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                - Liveness check
//! GET   /health/ready          - Readiness check (store reachable)
//!
//! # Users
//! POST  /users/create          - Sign up
//! POST  /users/token           - Exchange credentials for a token
//! GET   /users/me              - Current user (requires token)
//! PATCH /users/me              - Update name/password (requires token)
//! ```

pub mod health;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(users::create_user))
        .route("/token", post(users::create_token))
        .route("/me", get(users::me).patch(users::update_me))
}

/// Create all routes for the accounts API.
///
/// When `limiter` is given it wraps the `/users` routes only; health checks
/// stay unlimited.
pub fn routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let users = match limiter {
        Some(layer) => user_routes().layer(layer),
        None => user_routes(),
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/users", users)
}
