//! Consent use cases.
//!
//! Every mutation runs the status guard locally before calling the store. The
//! store re-checks; if it then refuses a change the local guard allowed, the
//! consent moved underneath us and the caller sees
//! [`crate::domain::ErrorCode::Conflict`].

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{ConsentFilter, ConsentStore, StoreError, TemplateCatalogue};
use crate::domain::{
    Consent, ConsentAction, ConsentDraft, ConsentId, ConsentStatus, ConsentValidationError,
    DashboardBuckets, Error, Session, TemplateCloneError, TemplateId, TransitionEffect,
    TransitionError, UserId, authorize, partition_dashboard, pending_invitations,
    sent_invitations,
};

/// Translate a store failure into a domain error.
pub(crate) fn map_store_error(error: StoreError) -> Error {
    debug!(retryable = error.is_retryable(), %error, "store call failed");
    match error {
        StoreError::Validation { message } => Error::invalid_request(message),
        StoreError::InvalidTransition { message } => Error::invalid_transition(message),
        StoreError::NotAuthorized { message } => Error::forbidden(message),
        StoreError::Unauthenticated { message } => Error::unauthorized(message),
        StoreError::NotFound { message } => Error::not_found(message),
        StoreError::Conflict { message } => Error::conflict(message),
        StoreError::Timeout { message } => {
            Error::service_unavailable(format!("marketplace store timed out: {message}"))
        }
        StoreError::Transport { message } => {
            Error::service_unavailable(format!("marketplace store unavailable: {message}"))
        }
        StoreError::Decode { message } => {
            Error::internal(format!("unexpected marketplace response: {message}"))
        }
    }
}

/// Translate a store failure raised after the local guard already passed.
fn map_guarded_store_error(id: &ConsentId, error: StoreError) -> Error {
    match error {
        StoreError::InvalidTransition { message } | StoreError::NotFound { message } => {
            Error::conflict(format!("consent {id} changed concurrently: {message}"))
        }
        other => map_store_error(other),
    }
}

pub(crate) fn map_validation_error(error: &ConsentValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": error.field() }))
}

fn map_transition_error(error: &TransitionError) -> Error {
    if error.is_not_authorized() {
        Error::forbidden(error.to_string())
    } else {
        Error::invalid_transition(error.to_string())
    }
}

pub(crate) fn map_clone_error(error: &TemplateCloneError) -> Error {
    match error {
        TemplateCloneError::Invalid(invalid) => map_validation_error(invalid),
        TemplateCloneError::Private { .. } => Error::forbidden(error.to_string()),
    }
}

/// Consent service driving the [`ConsentStore`] port.
pub struct ConsentService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ConsentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ConsentService<S>
where
    S: ConsentStore + ?Sized,
{
    /// Create a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate `draft` and persist it as a pending consent.
    ///
    /// Validation failures never reach the store and carry the offending
    /// field in `details.field`.
    pub async fn create(&self, session: &Session, draft: ConsentDraft) -> Result<Consent, Error> {
        let new = draft
            .validate(session.user_id())
            .map_err(|err| map_validation_error(&err))?;
        let consent = self
            .store
            .create(session, &new)
            .await
            .map_err(map_store_error)?;
        info!(
            consent_id = %consent.id(),
            created_by = %consent.created_by(),
            involved = consent.involved_users().len(),
            "consent created"
        );
        Ok(consent)
    }

    /// Fetch one consent visible to the session user.
    pub async fn get(&self, session: &Session, id: &ConsentId) -> Result<Consent, Error> {
        self.store
            .get(session, id)
            .await
            .map_err(map_store_error)?
            .filter(|consent| consent.is_visible_to(session.user_id()))
            .ok_or_else(|| Error::not_found(format!("consent {id} not found")))
    }

    /// List consents involving `user`, optionally narrowed to one status.
    pub async fn consents_for_user(
        &self,
        session: &Session,
        user: &UserId,
        status: Option<ConsentStatus>,
    ) -> Result<Vec<Consent>, Error> {
        let filter = ConsentFilter { status };
        let consents = self
            .store
            .list_for_user(session, user, filter)
            .await
            .map_err(map_store_error)?;
        Ok(consents
            .into_iter()
            .filter(|consent| filter.matches(consent))
            .collect())
    }

    /// Bucket the session user's consents for the dashboard.
    pub async fn dashboard(&self, session: &Session) -> Result<DashboardBuckets, Error> {
        let user = session.user_id();
        let consents = self.consents_for_user(session, user, None).await?;
        let buckets = partition_dashboard(user, &consents);
        debug!(
            user_id = %user,
            fetched = consents.len(),
            bucketed = buckets.len(),
            "dashboard partitioned"
        );
        Ok(buckets)
    }

    /// Invitations the session user created that nobody has acted on yet.
    pub async fn sent_invitations(&self, session: &Session) -> Result<Vec<Consent>, Error> {
        let user = session.user_id();
        let consents = self
            .store
            .list_created_by(session, user)
            .await
            .map_err(map_store_error)?;
        Ok(sent_invitations(user, &consents))
    }

    /// Invitations awaiting the session user's answer.
    pub async fn pending_invitations(&self, session: &Session) -> Result<Vec<Consent>, Error> {
        let user = session.user_id();
        let consents = self
            .consents_for_user(session, user, Some(ConsentStatus::Pending))
            .await?;
        Ok(pending_invitations(user, &consents))
    }

    /// Sign a consent as the session user.
    pub async fn accept(&self, session: &Session, id: &ConsentId) -> Result<Consent, Error> {
        let effect = self.guard(session, id, ConsentAction::Accept).await?;
        let consent = self
            .store
            .accept(session, id)
            .await
            .map_err(|err| map_guarded_store_error(id, err))?;
        info!(
            consent_id = %id,
            actor = %session.user_id(),
            ?effect,
            status = %consent.status(),
            "consent accepted"
        );
        Ok(consent)
    }

    /// Decline an invitation as the session user.
    pub async fn reject(&self, session: &Session, id: &ConsentId) -> Result<(), Error> {
        self.guard(session, id, ConsentAction::Reject).await?;
        self.store
            .reject(session, id)
            .await
            .map_err(|err| map_guarded_store_error(id, err))?;
        info!(consent_id = %id, actor = %session.user_id(), "consent rejected");
        Ok(())
    }

    /// Withdraw a pending invitation created by the session user.
    pub async fn delete(&self, session: &Session, id: &ConsentId) -> Result<(), Error> {
        self.guard(session, id, ConsentAction::Delete).await?;
        self.store
            .delete(session, id)
            .await
            .map_err(|err| map_guarded_store_error(id, err))?;
        info!(consent_id = %id, actor = %session.user_id(), "consent deleted");
        Ok(())
    }

    /// Clone a template into a new pending consent owned by the session user.
    pub async fn clone_template<C>(
        &self,
        catalogue: &C,
        session: &Session,
        template: &TemplateId,
        title: &str,
    ) -> Result<Consent, Error>
    where
        C: TemplateCatalogue + ?Sized,
    {
        let found = catalogue
            .get(Some(session), template)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("template {template} not found")))?;
        found
            .clone_as(title, session.user_id())
            .map_err(|err| map_clone_error(&err))?;
        let consent = catalogue
            .clone_template(session, template, title.trim())
            .await
            .map_err(map_store_error)?;
        info!(
            template_id = %template,
            consent_id = %consent.id(),
            actor = %session.user_id(),
            "template cloned"
        );
        Ok(consent)
    }

    async fn guard(
        &self,
        session: &Session,
        id: &ConsentId,
        action: ConsentAction,
    ) -> Result<TransitionEffect, Error> {
        let consent = self
            .store
            .get(session, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("consent {id} not found")))?;
        authorize(&consent, session.user_id(), action).map_err(|err| {
            let error = map_transition_error(&err);
            debug!(
                consent_id = %id,
                actor = %session.user_id(),
                %action,
                code = ?error.code(),
                "status guard refused action"
            );
            error
        })
    }
}

#[cfg(test)]
#[path = "consent_service_tests.rs"]
mod tests;
