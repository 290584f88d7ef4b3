//! Behaviour-driven tests for the consent lifecycle.
//!
//! Scenarios drive [`ConsentService`] against the in-memory marketplace so the
//! local status guard and the store's atomic transition agree end to end.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use consent_client::domain::{
    AccessToken, Consent, ConsentDraft, ConsentId, ConsentService, ConsentStatus, Error, Session,
    Template, TemplateId, User, UserId, UserRole,
};
use consent_client::outbound::memory::InMemoryMarketplace;
use mockable::Clock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

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

/// Wrapper for non-Clone types to enable storage in `Slot`.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

/// Test world holding the marketplace and the outcome of the last action.
#[derive(Default, ScenarioState)]
struct LifecycleWorld {
    runtime: Slot<RuntimeHandle>,
    marketplace: Slot<Arc<InMemoryMarketplace>>,
    consent: Slot<ConsentId>,
    template: Slot<TemplateId>,
    outcome: Slot<Result<(), Error>>,
}

impl LifecycleWorld {
    fn marketplace(&self) -> Arc<InMemoryMarketplace> {
        if let Some(marketplace) = self.marketplace.get() {
            return marketplace;
        }
        let runtime = Runtime::new().expect("create runtime");
        let marketplace = Arc::new(InMemoryMarketplace::new(Arc::new(FixedClock)));
        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.marketplace.set(Arc::clone(&marketplace));
        marketplace
    }

    fn service(&self) -> ConsentService<InMemoryMarketplace> {
        ConsentService::new(self.marketplace())
    }

    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.marketplace();
        let runtime = self.runtime.get().expect("runtime");
        runtime.0.block_on(future)
    }

    fn consent_id(&self) -> ConsentId {
        self.consent.get().expect("a consent was created")
    }

    fn create(&self, creator: &str, invitees: Vec<String>) {
        let service = self.service();
        let draft = ConsentDraft {
            title: "Brand Partnership".to_owned(),
            description: "Sponsored content series".to_owned(),
            created_by: None,
            involved_users: invitees,
        };
        let consent = self
            .block_on(service.create(&session(creator), draft))
            .expect("consent created");
        self.consent.set(consent.id().clone());
    }

    fn record(&self, outcome: Result<(), Error>) {
        self.outcome.set(outcome);
    }

    fn stored(&self) -> Option<Consent> {
        let id = self.consent_id();
        let marketplace = self.marketplace();
        self.block_on(marketplace.consents())
            .into_iter()
            .find(|consent| *consent.id() == id)
    }

    fn clone_template(&self, user: &str, title: &str) -> Result<(), Error> {
        let service = self.service();
        let marketplace = self.marketplace();
        let template = self.template.get().expect("a template was seeded");
        let consent = self.block_on(service.clone_template(
            marketplace.as_ref(),
            &session(user),
            &template,
            title,
        ))?;
        self.consent.set(consent.id().clone());
        Ok(())
    }

    fn seed_template(&self, owner: &str, is_public: bool) {
        let id = TemplateId::new("template-1").expect("template id");
        let template = Template {
            id: id.clone(),
            title: "Music Licensing Agreement".to_owned(),
            content: "Usage rights.\n\nPayment schedule.".to_owned(),
            description: "Standard licensing template".to_owned(),
            created_by: UserId::new(owner).expect("user id"),
            category: "Music".to_owned(),
            is_public,
            created_at: fixed_time(),
        };
        let marketplace = self.marketplace();
        self.block_on(marketplace.seed_templates([template]));
        self.template.set(id);
    }
}

fn session(id: &str) -> Session {
    let user = User::try_new(
        UserId::new(id).expect("user id"),
        format!("User {id}"),
        format!("user{id}@example.com"),
        UserRole::Artist,
        fixed_time(),
    )
    .expect("valid user");
    Session::new(user, AccessToken::new(format!("token-{id}")).expect("token"))
}

#[fixture]
fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("user {creator} invited user {invitee}")]
fn user_invited_one(world: &LifecycleWorld, creator: String, invitee: String) {
    world.create(&creator, vec![invitee]);
}

#[given("user {creator} invited users {first} and {second}")]
fn user_invited_two(world: &LifecycleWorld, creator: String, first: String, second: String) {
    world.create(&creator, vec![first, second]);
}

#[given("user {user} has accepted the consent")]
fn user_has_accepted(world: &LifecycleWorld, user: String) {
    let service = world.service();
    world
        .block_on(service.accept(&session(&user), &world.consent_id()))
        .expect("earlier acceptance succeeds");
}

#[given("a public template owned by user {owner}")]
fn public_template(world: &LifecycleWorld, owner: String) {
    world.seed_template(&owner, true);
}

#[given("user {user} has cloned the template as {title}")]
fn user_has_cloned_template(world: &LifecycleWorld, user: String, title: String) {
    world
        .clone_template(&user, &title)
        .expect("clone succeeds");
}

#[given("a private template owned by user {owner}")]
fn private_template(world: &LifecycleWorld, owner: String) {
    world.seed_template(&owner, false);
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("user {user} accepts the consent")]
fn user_accepts(world: &LifecycleWorld, user: String) {
    let service = world.service();
    let outcome = world
        .block_on(service.accept(&session(&user), &world.consent_id()))
        .map(|_| ());
    world.record(outcome);
}

#[when("user {user} rejects the consent")]
fn user_rejects(world: &LifecycleWorld, user: String) {
    let service = world.service();
    let outcome = world.block_on(service.reject(&session(&user), &world.consent_id()));
    world.record(outcome);
}

#[when("user {user} deletes the consent")]
fn user_deletes(world: &LifecycleWorld, user: String) {
    let service = world.service();
    let outcome = world.block_on(service.delete(&session(&user), &world.consent_id()));
    world.record(outcome);
}

#[when("user {user} submits a consent without a title")]
fn user_submits_untitled(world: &LifecycleWorld, user: String) {
    let service = world.service();
    let draft = ConsentDraft {
        title: "   ".to_owned(),
        description: "Sponsored content series".to_owned(),
        created_by: None,
        involved_users: vec!["1".to_owned()],
    };
    let outcome = world
        .block_on(service.create(&session(&user), draft))
        .map(|_| ());
    world.record(outcome);
}

#[when("user {user} clones the template as {title}")]
fn user_clones_template(world: &LifecycleWorld, user: String, title: String) {
    let outcome = world.clone_template(&user, &title);
    world.record(outcome);
}

#[when("user {user} submits a consent inviting only themselves")]
fn user_invites_only_themselves(world: &LifecycleWorld, user: String) {
    let service = world.service();
    let draft = ConsentDraft {
        title: "Solo project".to_owned(),
        description: "Nobody else is involved".to_owned(),
        created_by: None,
        involved_users: vec![user.clone()],
    };
    let outcome = world
        .block_on(service.create(&session(&user), draft))
        .map(|_| ());
    world.record(outcome);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the action succeeds")]
fn action_succeeds(world: &LifecycleWorld) {
    let outcome = world.outcome.get().expect("an action was taken");
    assert!(outcome.is_ok(), "expected success, got {outcome:?}");
}

#[then("the action is refused with {code}")]
fn action_refused(world: &LifecycleWorld, code: String) {
    let outcome = world.outcome.get().expect("an action was taken");
    let error = outcome.expect_err("expected a refusal");
    let actual = serde_json::to_value(error.code()).expect("code serializes");
    assert_eq!(actual, serde_json::Value::String(code), "refusal: {error}");
}

#[then("the refusal names the {field} field")]
fn refusal_names_field(world: &LifecycleWorld, field: String) {
    let outcome = world.outcome.get().expect("an action was taken");
    let error = outcome.expect_err("expected a refusal");
    assert_eq!(error.field(), Some(field.as_str()));
}

#[then("the consent status is {status}")]
fn consent_status_is(world: &LifecycleWorld, status: String) {
    let expected: ConsentStatus = status.parse().expect("known status");
    let consent = world.stored().expect("consent still stored");
    assert_eq!(consent.status(), expected);
}

#[then("the consent carries {count} signatures")]
fn consent_carries_signatures(world: &LifecycleWorld, count: String) {
    let expected: usize = count.parse().expect("numeric count");
    let consent = world.stored().expect("consent still stored");
    assert_eq!(consent.signatures().len(), expected);
}

#[then("the consent has {count} clauses")]
fn consent_has_clauses(world: &LifecycleWorld, count: String) {
    let expected: usize = count.parse().expect("numeric count");
    let consent = world.stored().expect("consent still stored");
    assert_eq!(consent.clauses().len(), expected);
}

#[then("the consent no longer exists")]
fn consent_no_longer_exists(world: &LifecycleWorld) {
    assert!(world.stored().is_none());
}

#[then("the marketplace holds no consents")]
fn marketplace_is_empty(world: &LifecycleWorld) {
    let marketplace = world.marketplace();
    assert!(world.block_on(marketplace.consents()).is_empty());
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "Every invitee signing hands the consent back to the creator"
)]
fn every_invitee_signing_hands_back(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "A partially signed consent stays pending"
)]
fn partially_signed_stays_pending(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "The creator counter-signature starts the collaboration"
)]
fn creator_counter_signature(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "Users outside the consent cannot accept it"
)]
fn outsiders_cannot_accept(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "The creator cannot sign before the invitees"
)]
fn creator_cannot_sign_first(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "An invitee cannot sign twice"
)]
fn invitee_cannot_sign_twice(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "An invitee declines the invitation"
)]
fn invitee_declines(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "The creator withdraws a pending invitation"
)]
fn creator_withdraws(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "Invitees cannot withdraw someone else's invitation"
)]
fn invitees_cannot_withdraw(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "A consent without a title is never stored"
)]
fn untitled_consent_is_refused(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "Cloning a public template starts a pending consent"
)]
fn cloning_public_template(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "A cloned consent can be signed by its owner alone"
)]
fn cloned_consent_signed_by_owner(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "A consent inviting only its creator is never stored"
)]
fn self_only_consent_is_refused(world: LifecycleWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/consent_lifecycle.feature",
    name = "Private templates stay with their owner"
)]
fn private_templates_stay_private(world: LifecycleWorld) {
    let _ = world;
}
