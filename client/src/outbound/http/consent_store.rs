//! [`ConsentStore`] over the REST API.

use async_trait::async_trait;
use reqwest::Method;

use super::MarketplaceHttpClient;
use super::dto::{ActorRequest, CreateConsentRequest};
use crate::domain::ports::{ConsentFilter, ConsentStore, StoreError};
use crate::domain::{Consent, ConsentId, NewConsent, Session, UserId};

#[async_trait]
impl ConsentStore for MarketplaceHttpClient {
    async fn create(
        &self,
        session: &Session,
        consent: &NewConsent,
    ) -> Result<Consent, StoreError> {
        let request = self
            .request(Method::POST, self.endpoint(&["consent"]), Some(session.token()))
            .json(&CreateConsentRequest::from(consent));
        self.fetch(request).await
    }

    async fn get(&self, session: &Session, id: &ConsentId) -> Result<Option<Consent>, StoreError> {
        let request = self.request(
            Method::GET,
            self.endpoint(&["consent", id.as_ref()]),
            Some(session.token()),
        );
        self.fetch_optional(request).await
    }

    async fn list_for_user(
        &self,
        session: &Session,
        user: &UserId,
        filter: ConsentFilter,
    ) -> Result<Vec<Consent>, StoreError> {
        let mut request = self.request(
            Method::GET,
            self.endpoint(&["consent", "user", user.as_ref()]),
            Some(session.token()),
        );
        if let Some(status) = filter.status {
            request = request.query(&[("status", status.as_str())]);
        }
        self.fetch(request).await
    }

    async fn list_created_by(
        &self,
        session: &Session,
        creator: &UserId,
    ) -> Result<Vec<Consent>, StoreError> {
        let request = self.request(
            Method::GET,
            self.endpoint(&["consent", "creator", creator.as_ref()]),
            Some(session.token()),
        );
        self.fetch(request).await
    }

    async fn accept(&self, session: &Session, id: &ConsentId) -> Result<Consent, StoreError> {
        let request = self
            .request(
                Method::POST,
                self.endpoint(&["consent", id.as_ref(), "accept"]),
                Some(session.token()),
            )
            .json(&ActorRequest {
                user_id: session.user_id(),
            });
        self.fetch(request).await
    }

    async fn reject(&self, session: &Session, id: &ConsentId) -> Result<(), StoreError> {
        let request = self
            .request(
                Method::POST,
                self.endpoint(&["consent", id.as_ref(), "reject"]),
                Some(session.token()),
            )
            .json(&ActorRequest {
                user_id: session.user_id(),
            });
        self.acknowledge(request).await
    }

    async fn delete(&self, session: &Session, id: &ConsentId) -> Result<(), StoreError> {
        let request = self.request(
            Method::DELETE,
            self.endpoint(&["consent", id.as_ref()]),
            Some(session.token()),
        );
        self.acknowledge(request).await
    }
}
