//! Integration tests for Recipe Accounts.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store; no external services needed
//! cargo test -p recipe-accounts-integration-tests
//!
//! # Include the PostgreSQL store tests
//! ACCOUNTS_TEST_DATABASE_URL=postgres://localhost/recipe_accounts_test \
//!     cargo test -p recipe-accounts-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `users_api` - HTTP tests against a live server on an ephemeral port
//! - `router` - in-process router tests via `tower::ServiceExt::oneshot`
//! - `postgres_store` - `PgUserStore` against a real database (ignored by default)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use recipe_accounts_server::config::AccountsConfig;
use recipe_accounts_server::db::{self, MemoryUserStore, PgUserStore, UserStore};
use recipe_accounts_server::middleware::RateLimiterLayer;
use recipe_accounts_server::state::AppState;

/// Error type for test setup.
pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// Application state over a fresh in-memory store with cheap hashing.
///
/// # Errors
///
/// Returns an error if the test hashing parameters are rejected.
pub fn memory_state() -> Result<AppState, SetupError> {
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    Ok(AppState::new(AccountsConfig::for_tests(), store)?)
}

/// Router over [`memory_state`], optionally rate limited.
///
/// # Errors
///
/// Returns an error if the state cannot be built.
pub fn memory_router(limiter: Option<RateLimiterLayer>) -> Result<Router, SetupError> {
    Ok(recipe_accounts_server::app(memory_state()?, limiter))
}

/// Connect to the test database named by `ACCOUNTS_TEST_DATABASE_URL` and
/// apply migrations. Returns `None` when the variable is unset.
///
/// # Errors
///
/// Returns an error if the database is unreachable or migrations fail.
pub async fn test_pool() -> Result<Option<PgPool>, SetupError> {
    let Ok(url) = std::env::var("ACCOUNTS_TEST_DATABASE_URL") else {
        return Ok(None);
    };

    let pool = db::create_pool(&SecretString::from(url)).await?;
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    Ok(Some(pool))
}

/// [`PgUserStore`] over [`test_pool`].
///
/// # Errors
///
/// Returns an error if the database is unreachable or migrations fail.
pub async fn postgres_store() -> Result<Option<PgUserStore>, SetupError> {
    Ok(test_pool().await?.map(PgUserStore::new))
}

/// A server listening on an ephemeral localhost port.
///
/// The server task is aborted when this value is dropped.
pub struct TestServer {
    addr: SocketAddr,
    client: Client,
    state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server over a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be built or the port cannot be bound.
    pub async fn spawn() -> Result<Self, SetupError> {
        Self::spawn_with(memory_state()?).await
    }

    /// Spawn a server over the given state.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound.
    pub async fn spawn_with(state: AppState) -> Result<Self, SetupError> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = recipe_accounts_server::app(state.clone(), None);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            client: Client::new(),
            state,
            handle,
        })
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// HTTP client for talking to this server.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// State shared with the running server.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
