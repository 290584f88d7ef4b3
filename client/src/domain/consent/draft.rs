//! Consent creation drafts and their validation.

use crate::domain::UserId;

/// Raw consent creation input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentDraft {
    /// Project title.
    pub title: String,
    /// Project description.
    pub description: String,
    /// Creator id, when the caller supplies one explicitly.
    pub created_by: Option<String>,
    /// Ids of the users to invite.
    pub involved_users: Vec<String>,
}

/// Validation failures for [`ConsentDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsentValidationError {
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Description was blank.
    #[error("description must not be empty")]
    EmptyDescription,
    /// The supplied creator differs from the authenticated caller.
    #[error("createdBy must be the authenticated user (got {supplied})")]
    CreatorMismatch {
        /// Creator named in the draft.
        supplied: String,
    },
    /// No user other than the creator was invited.
    #[error("involvedUsers must name at least one user besides the creator")]
    NoInvolvedUsers,
    /// An invited user id was malformed.
    #[error("involvedUsers contains an invalid user id: {value:?}")]
    InvalidInvolvedUser {
        /// Offending value.
        value: String,
    },
}

impl ConsentValidationError {
    /// Wire name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyDescription => "description",
            Self::CreatorMismatch { .. } => "createdBy",
            Self::NoInvolvedUsers | Self::InvalidInvolvedUser { .. } => "involvedUsers",
        }
    }
}

/// A validated consent ready to be sent to the store.
///
/// Always created in `pending` status with no signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConsent {
    /// Trimmed title.
    pub title: String,
    /// Trimmed description.
    pub description: String,
    /// Authenticated creator.
    pub created_by: UserId,
    /// Invited users, de-duplicated in first-seen order.
    pub involved_users: Vec<UserId>,
    /// Initial clause texts. Empty for direct creation.
    pub clauses: Vec<String>,
}

impl ConsentDraft {
    /// Validate the draft on behalf of `actor`.
    ///
    /// # Examples
    /// ```
    /// use consent_client::domain::{ConsentDraft, UserId};
    ///
    /// let actor = UserId::new("3").unwrap();
    /// let draft = ConsentDraft {
    ///     title: "Soundtrack".into(),
    ///     description: "Eight tracks".into(),
    ///     created_by: None,
    ///     involved_users: vec!["1".into()],
    /// };
    /// let new = draft.validate(&actor).unwrap();
    /// assert_eq!(new.created_by, actor);
    /// assert!(new.clauses.is_empty());
    /// ```
    pub fn validate(self, actor: &UserId) -> Result<NewConsent, ConsentValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ConsentValidationError::EmptyTitle);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ConsentValidationError::EmptyDescription);
        }
        if let Some(supplied) = self.created_by
            && supplied != actor.as_ref()
        {
            return Err(ConsentValidationError::CreatorMismatch { supplied });
        }

        let mut involved_users: Vec<UserId> = Vec::with_capacity(self.involved_users.len());
        for raw in self.involved_users {
            let user = UserId::new(raw.trim())
                .map_err(|_| ConsentValidationError::InvalidInvolvedUser { value: raw.clone() })?;
            if !involved_users.contains(&user) {
                involved_users.push(user);
            }
        }
        if !involved_users.iter().any(|user| user != actor) {
            return Err(ConsentValidationError::NoInvolvedUsers);
        }

        Ok(NewConsent {
            title: title.to_owned(),
            description: description.to_owned(),
            created_by: actor.clone(),
            involved_users,
            clauses: Vec::new(),
        })
    }
}
