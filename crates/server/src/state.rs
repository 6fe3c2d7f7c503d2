//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AccountsConfig;
use crate::db::UserStore;
use crate::services::auth::{AuthError, Passwords, TokenIssuer, UserDirectory};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the user store and the services built over it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AccountsConfig,
    store: Arc<dyn UserStore>,
    directory: UserDirectory,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - User store backing the directory and token issuer
    ///
    /// # Errors
    ///
    /// Returns `AuthError::HashingParams` if the Argon2 parameters are invalid.
    pub fn new(config: AccountsConfig, store: Arc<dyn UserStore>) -> Result<Self, AuthError> {
        let passwords = Arc::new(Passwords::new(config.hashing)?);
        let directory = UserDirectory::new(Arc::clone(&store), passwords);
        let tokens = TokenIssuer::new(directory.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                directory,
                tokens,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AccountsConfig {
        &self.inner.config
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }

    /// Get the user directory.
    #[must_use]
    pub fn directory(&self) -> &UserDirectory {
        &self.inner.directory
    }

    /// Get the token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
