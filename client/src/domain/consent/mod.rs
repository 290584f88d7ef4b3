//! Consent aggregate: the agreement between a creator and invited users.
//!
//! A consent owns its clauses and signatures. Status changes are decided by
//! [`authorize`] and applied with [`Consent::with_signature`]; removal
//! (reject or delete) is carried out by the store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

mod draft;
mod status;
mod transition;

pub use draft::{ConsentDraft, ConsentValidationError, NewConsent};
pub use status::{ConsentStatus, ParseConsentStatusError};
pub use transition::{ConsentAction, TransitionEffect, TransitionError, authorize};

/// Error raised when an identifier is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} id must not be blank")]
pub struct BlankIdError {
    kind: &'static str,
}

/// Stable consent identifier issued by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConsentId(String);

impl ConsentId {
    /// Validate and construct a [`ConsentId`].
    pub fn new(id: impl Into<String>) -> Result<Self, BlankIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(BlankIdError { kind: "consent" });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ConsentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ConsentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ConsentId> for String {
    fn from(value: ConsentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ConsentId {
    type Error = BlankIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Immutable contract term owned by one consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    /// Clause identifier.
    pub id: String,
    /// Free-text term.
    pub content: String,
    /// Owning consent.
    pub consent_id: ConsentId,
}

/// Append-only record of a user accepting a consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    /// Signature identifier.
    pub id: String,
    /// Signing user.
    pub user_id: UserId,
    /// Signed consent.
    pub consent_id: ConsentId,
    /// Time of signing.
    pub signed_at: DateTime<Utc>,
}

/// Collaboration agreement between a creator and invited users.
///
/// ## Invariants
/// - `created_by` is the initiator; it may or may not also appear in
///   `involved_users`.
/// - Each user appears at most once in `signatures`.
/// - Clauses and signatures reference this consent's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    id: ConsentId,
    title: String,
    description: String,
    created_by: UserId,
    involved_users: Vec<UserId>,
    status: ConsentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    clauses: Vec<Clause>,
    #[serde(default)]
    signatures: Vec<Signature>,
}

impl Consent {
    /// Start building a consent in `pending` status with no terms.
    pub fn builder(id: ConsentId, created_by: UserId, created_at: DateTime<Utc>) -> ConsentBuilder {
        ConsentBuilder {
            consent: Self {
                id,
                title: String::new(),
                description: String::new(),
                created_by,
                involved_users: Vec::new(),
                status: ConsentStatus::Pending,
                created_at,
                updated_at: created_at,
                clauses: Vec::new(),
                signatures: Vec::new(),
            },
        }
    }

    /// Materialise a validated draft as a stored consent.
    pub fn from_new(id: ConsentId, new: NewConsent, now: DateTime<Utc>) -> Self {
        let clauses = new
            .clauses
            .into_iter()
            .enumerate()
            .map(|(index, content)| Clause {
                id: format!("{id}-clause-{}", index + 1),
                content,
                consent_id: id.clone(),
            })
            .collect();
        let mut consent = Self::builder(id, new.created_by, now).build();
        consent.title = new.title;
        consent.description = new.description;
        consent.involved_users = new.involved_users;
        consent.clauses = clauses;
        consent
    }

    /// Consent identifier.
    pub fn id(&self) -> &ConsentId {
        &self.id
    }

    /// Short title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Longer description of the collaboration.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Initiating user.
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// Users invited to the consent.
    pub fn involved_users(&self) -> &[UserId] {
        self.involved_users.as_slice()
    }

    /// Current status.
    pub fn status(&self) -> ConsentStatus {
        self.status
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Contract terms in order.
    pub fn clauses(&self) -> &[Clause] {
        self.clauses.as_slice()
    }

    /// Signatures in signing order.
    pub fn signatures(&self) -> &[Signature] {
        self.signatures.as_slice()
    }

    /// Whether `user` is the creator or an involved user.
    pub fn is_visible_to(&self, user: &UserId) -> bool {
        self.created_by == *user || self.involves(user)
    }

    /// Whether `user` is listed in `involved_users`.
    pub fn involves(&self, user: &UserId) -> bool {
        self.involved_users.contains(user)
    }

    /// Whether `user` has already signed.
    pub fn is_signed_by(&self, user: &UserId) -> bool {
        self.signatures.iter().any(|signature| signature.user_id == *user)
    }

    /// Involved users other than the creator.
    pub fn invitees(&self) -> impl Iterator<Item = &UserId> {
        self.involved_users
            .iter()
            .filter(move |user| **user != self.created_by)
    }

    /// Return a copy with `actor`'s signature appended and `next` status.
    ///
    /// Callers obtain `next` from [`authorize`]; this method does not re-check
    /// the transition.
    #[must_use]
    pub fn with_signature(
        &self,
        actor: &UserId,
        next: ConsentStatus,
        signed_at: DateTime<Utc>,
    ) -> Self {
        let mut updated = self.clone();
        updated.signatures.push(Signature {
            id: format!("sig-{}", Uuid::new_v4()),
            user_id: actor.clone(),
            consent_id: self.id.clone(),
            signed_at,
        });
        updated.status = next;
        updated.updated_at = signed_at;
        updated
    }
}

/// Builder for [`Consent`] values held by adapters and tests.
#[derive(Debug, Clone)]
pub struct ConsentBuilder {
    consent: Consent,
}

impl ConsentBuilder {
    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.consent.title = title.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.consent.description = description.into();
        self
    }

    /// Set the involved users.
    #[must_use]
    pub fn involved_users(mut self, users: Vec<UserId>) -> Self {
        self.consent.involved_users = users;
        self
    }

    /// Set the status.
    #[must_use]
    pub fn status(mut self, status: ConsentStatus) -> Self {
        self.consent.status = status;
        self
    }

    /// Set the last-update time.
    #[must_use]
    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.consent.updated_at = updated_at;
        self
    }

    /// Append a clause with the given content.
    #[must_use]
    pub fn clause(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        let consent_id = self.consent.id.clone();
        self.consent.clauses.push(Clause {
            id: id.into(),
            content: content.into(),
            consent_id,
        });
        self
    }

    /// Append a signature by `user_id`.
    #[must_use]
    pub fn signature(
        mut self,
        id: impl Into<String>,
        user_id: UserId,
        signed_at: DateTime<Utc>,
    ) -> Self {
        let consent_id = self.consent.id.clone();
        self.consent.signatures.push(Signature {
            id: id.into(),
            user_id,
            consent_id,
            signed_at,
        });
        self
    }

    /// Finish building.
    pub fn build(self) -> Consent {
        self.consent
    }
}
