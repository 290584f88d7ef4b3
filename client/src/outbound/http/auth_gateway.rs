//! [`AuthGateway`] over the REST API.

use async_trait::async_trait;
use reqwest::Method;

use super::MarketplaceHttpClient;
use super::dto::{AuthPayload, LoginRequest, RegisterRequest};
use crate::domain::ports::{AuthGateway, StoreError};
use crate::domain::{AccessToken, LoginCredentials, Registration, Session, User};

#[async_trait]
impl AuthGateway for MarketplaceHttpClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, StoreError> {
        let request = self
            .request(Method::POST, self.endpoint(&["auth", "login"]), None)
            .json(&LoginRequest::from(credentials));
        let payload: AuthPayload = self.fetch(request).await?;
        payload.into_session()
    }

    async fn register(&self, registration: &Registration) -> Result<Session, StoreError> {
        let request = self
            .request(Method::POST, self.endpoint(&["auth", "register"]), None)
            .json(&RegisterRequest::from(registration));
        let payload: AuthPayload = self.fetch(request).await?;
        payload.into_session()
    }

    async fn current_user(&self, token: &AccessToken) -> Result<User, StoreError> {
        let request = self.request(Method::GET, self.endpoint(&["auth", "me"]), Some(token));
        self.fetch(request).await
    }
}
