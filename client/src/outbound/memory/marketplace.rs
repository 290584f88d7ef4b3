//! Authoritative in-memory marketplace.
//!
//! Holds consents and templates behind one async mutex so every mutation runs
//! the status guard and applies its effect atomically. Single-consent reads
//! are by id only, like `GET /consent/{id}`; participation is checked by the
//! guard. Identifiers are sequential (`consent-1`, `consent-2`, ...) and skip
//! any id a seeded consent already holds.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    ConsentFilter, ConsentStore, StoreError, TemplateCatalogue, TemplateQuery,
};
use crate::domain::{
    Consent, ConsentAction, ConsentId, NewConsent, Page, Session, Template, TemplateCloneError,
    TemplateId, TransitionEffect, TransitionError, UserId, authorize,
};

#[derive(Default)]
struct MarketplaceState {
    consents: Vec<Consent>,
    templates: Vec<Template>,
    issued: u64,
}

impl MarketplaceState {
    /// Next sequential id not already held by a seeded consent.
    fn next_id(&mut self) -> Result<ConsentId, StoreError> {
        loop {
            self.issued += 1;
            let id = ConsentId::new(format!("consent-{}", self.issued))
                .map_err(|error| StoreError::transport(error.to_string()))?;
            if self.consents.iter().all(|consent| *consent.id() != id) {
                return Ok(id);
            }
        }
    }

    fn position(&self, id: &ConsentId) -> Result<usize, StoreError> {
        self.consents
            .iter()
            .position(|consent| consent.id() == id)
            .ok_or_else(|| StoreError::not_found(format!("consent {id}")))
    }
}

/// In-memory [`ConsentStore`] and [`TemplateCatalogue`].
pub struct InMemoryMarketplace {
    state: Mutex<MarketplaceState>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryMarketplace {
    /// Empty marketplace stamping changes with `clock`.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Mutex::new(MarketplaceState::default()),
            clock,
        }
    }

    /// Seed existing consents.
    pub async fn seed_consents(&self, consents: impl IntoIterator<Item = Consent>) {
        self.state.lock().await.consents.extend(consents);
    }

    /// Publish templates.
    pub async fn seed_templates(&self, templates: impl IntoIterator<Item = Template>) {
        self.state.lock().await.templates.extend(templates);
    }

    /// Every stored consent, in insertion order.
    pub async fn consents(&self) -> Vec<Consent> {
        self.state.lock().await.consents.clone()
    }

    async fn transition(
        &self,
        session: &Session,
        id: &ConsentId,
        action: ConsentAction,
    ) -> Result<Option<Consent>, StoreError> {
        let actor = session.user_id();
        let mut state = self.state.lock().await;
        let index = state.position(id)?;
        let current = state
            .consents
            .get(index)
            .ok_or_else(|| StoreError::not_found(format!("consent {id}")))?;
        let effect = authorize(current, actor, action).map_err(|error| map_refusal(&error))?;

        match effect {
            TransitionEffect::Sign { next } => {
                let signed = current.with_signature(actor, next, self.clock.utc());
                if let Some(slot) = state.consents.get_mut(index) {
                    *slot = signed.clone();
                }
                debug!(consent_id = %id, actor = %actor, status = %next, "consent signed");
                Ok(Some(signed))
            }
            TransitionEffect::Remove => {
                state.consents.remove(index);
                debug!(consent_id = %id, actor = %actor, %action, "consent removed");
                Ok(None)
            }
        }
    }
}

fn map_refusal(error: &TransitionError) -> StoreError {
    if error.is_not_authorized() {
        StoreError::not_authorized(error.to_string())
    } else {
        StoreError::invalid_transition(error.to_string())
    }
}

fn visible_template(template: &Template, session: Option<&Session>) -> bool {
    template.is_public || session.is_some_and(|session| template.created_by == *session.user_id())
}

#[async_trait]
impl ConsentStore for InMemoryMarketplace {
    async fn create(
        &self,
        session: &Session,
        consent: &NewConsent,
    ) -> Result<Consent, StoreError> {
        if consent.created_by != *session.user_id() {
            return Err(StoreError::not_authorized(format!(
                "consent must be created by {}",
                session.user_id()
            )));
        }
        let mut state = self.state.lock().await;
        let id = state.next_id()?;
        let created = Consent::from_new(id, consent.clone(), self.clock.utc());
        state.consents.push(created.clone());
        Ok(created)
    }

    async fn get(&self, _session: &Session, id: &ConsentId) -> Result<Option<Consent>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .consents
            .iter()
            .find(|consent| consent.id() == id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        _session: &Session,
        user: &UserId,
        filter: ConsentFilter,
    ) -> Result<Vec<Consent>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .consents
            .iter()
            .filter(|consent| consent.is_visible_to(user) && filter.matches(consent))
            .cloned()
            .collect())
    }

    async fn list_created_by(
        &self,
        _session: &Session,
        creator: &UserId,
    ) -> Result<Vec<Consent>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .consents
            .iter()
            .filter(|consent| consent.created_by() == creator)
            .cloned()
            .collect())
    }

    async fn accept(&self, session: &Session, id: &ConsentId) -> Result<Consent, StoreError> {
        self.transition(session, id, ConsentAction::Accept)
            .await?
            .ok_or_else(|| StoreError::invalid_transition(format!("consent {id} was removed")))
    }

    async fn reject(&self, session: &Session, id: &ConsentId) -> Result<(), StoreError> {
        self.transition(session, id, ConsentAction::Reject)
            .await
            .map(|_| ())
    }

    async fn delete(&self, session: &Session, id: &ConsentId) -> Result<(), StoreError> {
        self.transition(session, id, ConsentAction::Delete)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl TemplateCatalogue for InMemoryMarketplace {
    async fn list(
        &self,
        session: Option<&Session>,
        query: &TemplateQuery,
    ) -> Result<Page<Template>, StoreError> {
        let state = self.state.lock().await;
        let matching: Vec<Template> = state
            .templates
            .iter()
            .filter(|template| visible_template(template, session))
            .filter(|template| {
                query
                    .category
                    .as_deref()
                    .is_none_or(|category| template.category.eq_ignore_ascii_case(category))
            })
            .cloned()
            .collect();
        Ok(Page::from_slice(&matching, query.page))
    }

    async fn get(
        &self,
        session: Option<&Session>,
        id: &TemplateId,
    ) -> Result<Option<Template>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .templates
            .iter()
            .find(|template| template.id == *id && visible_template(template, session))
            .cloned())
    }

    async fn clone_template(
        &self,
        session: &Session,
        id: &TemplateId,
        title: &str,
    ) -> Result<Consent, StoreError> {
        let mut state = self.state.lock().await;
        let template = state
            .templates
            .iter()
            .find(|template| template.id == *id)
            .ok_or_else(|| StoreError::not_found(format!("template {id}")))?;
        let new = template
            .clone_as(title, session.user_id())
            .map_err(|error| match error {
                TemplateCloneError::Private { .. } => StoreError::not_authorized(error.to_string()),
                TemplateCloneError::Invalid(_) => StoreError::validation(error.to_string()),
            })?;
        let consent_id = state.next_id()?;
        let created = Consent::from_new(consent_id, new, self.clock.utc());
        state.consents.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for atomic status changes.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{AccessToken, ConsentStatus, User, UserRole};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            fixed_time().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            fixed_time()
        }
    }

    fn session(id: &str) -> Session {
        let user = User::try_new(
            UserId::new(id).expect("user id"),
            format!("User {id}"),
            format!("user{id}@example.com"),
            UserRole::Company,
            fixed_time(),
        )
        .expect("valid user");
        Session::new(user, AccessToken::new("token").expect("token"))
    }

    fn new_consent(creator: &str, invitees: &[&str]) -> NewConsent {
        NewConsent {
            title: "Brand Partnership".to_owned(),
            description: "Sponsored content series".to_owned(),
            created_by: UserId::new(creator).expect("user id"),
            involved_users: invitees
                .iter()
                .map(|id| UserId::new(*id).expect("user id"))
                .collect(),
            clauses: Vec::new(),
        }
    }

    #[fixture]
    fn marketplace() -> InMemoryMarketplace {
        InMemoryMarketplace::new(Arc::new(FixedClock))
    }

    #[rstest]
    #[tokio::test]
    async fn create_issues_sequential_ids(marketplace: InMemoryMarketplace) {
        let creator = session("3");

        let first = marketplace
            .create(&creator, &new_consent("3", &["1"]))
            .await
            .expect("first");
        let second = marketplace
            .create(&creator, &new_consent("3", &["2"]))
            .await
            .expect("second");

        assert_eq!(first.id().as_ref(), "consent-1");
        assert_eq!(second.id().as_ref(), "consent-2");
        assert_eq!(first.created_at(), fixed_time());
    }

    #[rstest]
    #[tokio::test]
    async fn create_skips_ids_held_by_seeded_consents(marketplace: InMemoryMarketplace) {
        let seeded = Consent::builder(
            ConsentId::new("consent-1").expect("consent id"),
            UserId::new("5").expect("user id"),
            fixed_time(),
        )
        .involved_users(vec![UserId::new("2").expect("user id")])
        .build();
        marketplace.seed_consents([seeded]).await;

        let created = marketplace
            .create(&session("3"), &new_consent("3", &["1"]))
            .await
            .expect("created");
        let signed = marketplace
            .accept(&session("1"), created.id())
            .await
            .expect("invitee accepts the new consent");

        assert_eq!(created.id().as_ref(), "consent-2");
        assert_eq!(signed.id(), created.id());
        assert_eq!(signed.status(), ConsentStatus::WaitingAcceptance);
        let stored = marketplace.consents().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(
            stored.iter().filter(|consent| consent.id() == created.id()).count(),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn clone_can_be_signed_by_its_owner_alone(marketplace: InMemoryMarketplace) {
        let owner = session("3");
        let template = TemplateId::new("template-1").expect("template id");
        marketplace
            .seed_templates([Template {
                id: template.clone(),
                title: "Licence".to_owned(),
                content: "Usage rights.".to_owned(),
                description: "Standard licence".to_owned(),
                created_by: UserId::new("9").expect("user id"),
                category: "Music".to_owned(),
                is_public: true,
                created_at: fixed_time(),
            }])
            .await;

        let cloned = marketplace
            .clone_template(&owner, &template, "Album licence")
            .await
            .expect("cloned");
        let signed = marketplace
            .accept(&owner, cloned.id())
            .await
            .expect("owner signs");

        assert_eq!(signed.status(), ConsentStatus::Ongoing);
        assert_eq!(signed.signatures().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn create_for_another_user_is_refused(marketplace: InMemoryMarketplace) {
        let error = marketplace
            .create(&session("1"), &new_consent("3", &["1"]))
            .await
            .expect_err("impersonation refused");

        assert!(matches!(error, StoreError::NotAuthorized { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn second_accept_by_same_user_is_refused(marketplace: InMemoryMarketplace) {
        let created = marketplace
            .create(&session("3"), &new_consent("3", &["1", "2"]))
            .await
            .expect("created");

        let signed = marketplace
            .accept(&session("1"), created.id())
            .await
            .expect("first accept");
        let error = marketplace
            .accept(&session("1"), created.id())
            .await
            .expect_err("second accept");

        assert_eq!(signed.status(), ConsentStatus::Pending);
        assert!(matches!(error, StoreError::InvalidTransition { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn outsider_accept_is_not_authorized(marketplace: InMemoryMarketplace) {
        let created = marketplace
            .create(&session("3"), &new_consent("3", &["1"]))
            .await
            .expect("created");

        let error = marketplace
            .accept(&session("2"), created.id())
            .await
            .expect_err("outsider refused");

        assert!(matches!(error, StoreError::NotAuthorized { .. }));
        assert_eq!(
            marketplace.consents().await.first().map(Consent::status),
            Some(ConsentStatus::Pending)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn reject_removes_the_consent(marketplace: InMemoryMarketplace) {
        let created = marketplace
            .create(&session("3"), &new_consent("3", &["1"]))
            .await
            .expect("created");

        marketplace
            .reject(&session("1"), created.id())
            .await
            .expect("reject");
        let error = marketplace
            .delete(&session("3"), created.id())
            .await
            .expect_err("already gone");

        assert!(marketplace.consents().await.is_empty());
        assert!(matches!(error, StoreError::NotFound { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn private_templates_are_hidden_from_other_users(marketplace: InMemoryMarketplace) {
        marketplace
            .seed_templates([Template {
                id: TemplateId::new("template-2").expect("template id"),
                title: "Private draft".to_owned(),
                content: "Terms.".to_owned(),
                description: "Owner only".to_owned(),
                created_by: UserId::new("3").expect("user id"),
                category: "Art".to_owned(),
                is_public: false,
                created_at: fixed_time(),
            }])
            .await;

        let stranger = marketplace
            .list(Some(&session("1")), &TemplateQuery::default())
            .await
            .expect("list");
        let owner = marketplace
            .list(Some(&session("3")), &TemplateQuery::default())
            .await
            .expect("list");

        assert!(stranger.items.is_empty());
        assert_eq!(owner.items.len(), 1);
    }
}
