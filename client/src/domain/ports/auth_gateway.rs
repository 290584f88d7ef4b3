//! Driven port for exchanging credentials for a [`Session`].

use async_trait::async_trait;

use crate::domain::{AccessToken, LoginCredentials, Registration, Session, User};

use super::StoreError;

/// Port for authentication against the marketplace backend.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, StoreError>;

    /// Create an account and return its first session.
    async fn register(&self, registration: &Registration) -> Result<Session, StoreError>;

    /// Resolve the user owning `token`.
    async fn current_user(&self, token: &AccessToken) -> Result<User, StoreError>;
}
