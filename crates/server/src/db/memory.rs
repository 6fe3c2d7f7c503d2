//! In-memory user store.
//!
//! Used by tests and by `ACCOUNTS_STORE=memory` for local runs. All state lives
//! behind one lock, so each operation is atomic with respect to the others.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use recipe_accounts_core::{Email, TokenDigest, UserId};

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: HashMap<UserId, (User, String)>,
    by_email: HashMap<Email, UserId>,
    tokens: HashMap<TokenDigest, UserId>,
    token_by_user: HashMap<UserId, TokenDigest>,
}

/// [`UserStore`] kept entirely in process memory.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;

        if inner.by_email.contains_key(&new_user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let id = UserId::new(inner.next_id);
        let now = Utc::now();
        let user = User {
            id,
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            is_staff: new_user.kind.is_staff(),
            is_superuser: new_user.kind.is_superuser(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        inner.by_email.insert(user.email.clone(), id);
        inner
            .users
            .insert(id, (user.clone(), new_user.password_hash.clone()));

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .map(|(user, _)| user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let (user, stored) = inner.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        hash.clone_into(stored);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_name(&self, id: UserId, name: Option<&str>) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        let (user, _) = inner.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.name = name.map(str::to_owned);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        let (user, _) = inner.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.is_active = active;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn replace_token(
        &self,
        id: UserId,
        digest: &TokenDigest,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if inner.tokens.contains_key(digest) {
            return Err(RepositoryError::Conflict("token already exists".to_owned()));
        }

        if let Some(previous) = inner.token_by_user.insert(id, digest.clone()) {
            inner.tokens.remove(&previous);
        }
        inner.tokens.insert(digest.clone(), id);

        Ok(())
    }

    async fn get_by_token(&self, digest: &TokenDigest) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .get(digest)
            .and_then(|id| inner.users.get(id))
            .map(|(user, _)| user.clone()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
