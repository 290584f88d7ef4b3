//! Driven port for consent persistence and status changes.
//!
//! The store is authoritative: it re-checks every transition and serialises
//! concurrent mutations. The acting user is always the session user.

use async_trait::async_trait;

use crate::domain::{Consent, ConsentId, ConsentStatus, NewConsent, Session, UserId};

use super::StoreError;

/// Optional narrowing of consent listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentFilter {
    /// Only return consents in this status.
    pub status: Option<ConsentStatus>,
}

impl ConsentFilter {
    /// Filter for a single status.
    pub fn status(status: ConsentStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// Whether `consent` passes the filter.
    pub fn matches(&self, consent: &Consent) -> bool {
        self.status.is_none_or(|status| consent.status() == status)
    }
}

/// Port for reading and mutating consents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsentStore: Send + Sync {
    /// Persist a validated consent in `pending` status.
    async fn create(&self, session: &Session, consent: &NewConsent)
    -> Result<Consent, StoreError>;

    /// Fetch one consent.
    async fn get(&self, session: &Session, id: &ConsentId) -> Result<Option<Consent>, StoreError>;

    /// List consents where `user` is the creator or an involved user.
    async fn list_for_user(
        &self,
        session: &Session,
        user: &UserId,
        filter: ConsentFilter,
    ) -> Result<Vec<Consent>, StoreError>;

    /// List consents created by `creator`.
    async fn list_created_by(
        &self,
        session: &Session,
        creator: &UserId,
    ) -> Result<Vec<Consent>, StoreError>;

    /// Sign the consent as the session user and return the updated consent.
    async fn accept(&self, session: &Session, id: &ConsentId) -> Result<Consent, StoreError>;

    /// Decline the invitation as the session user; the consent is removed.
    async fn reject(&self, session: &Session, id: &ConsentId) -> Result<(), StoreError>;

    /// Withdraw a pending invitation created by the session user.
    async fn delete(&self, session: &Session, id: &ConsentId) -> Result<(), StoreError>;
}
