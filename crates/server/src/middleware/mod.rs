//! HTTP middleware stack for the accounts server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Rate limiting on `/users` (governor, optional)
//!
//! Token authentication is an extractor ([`RequireToken`]) rather than a
//! layer, so only the handlers that need a caller pay for the lookup.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireToken;
pub use rate_limit::{RateLimiterLayer, users_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
