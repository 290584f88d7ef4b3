//! Reusable consent templates and the rules for cloning them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ConsentValidationError, NewConsent, UserId};

/// Stable template identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Construct a [`TemplateId`], returning `None` for blank input.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.trim().is_empty()).then_some(Self(id))
    }
}

impl AsRef<str> for TemplateId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Consent blueprint published by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier.
    pub id: TemplateId,
    /// Template title.
    pub title: String,
    /// Agreement body; paragraphs become clauses when cloned.
    pub content: String,
    /// Short description copied into cloned consents.
    pub description: String,
    /// Owning user.
    pub created_by: UserId,
    /// Gallery category, for example `Music`.
    pub category: String,
    /// Whether users other than the owner may clone it.
    pub is_public: bool,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

/// Reasons a template cannot be cloned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateCloneError {
    /// The resulting consent would be invalid.
    #[error(transparent)]
    Invalid(#[from] ConsentValidationError),
    /// The template is private to another user.
    #[error("template {template} is private to its owner")]
    Private {
        /// Template that was requested.
        template: TemplateId,
    },
}

impl Template {
    /// Build the consent produced by cloning this template as `actor`.
    ///
    /// The clone starts `pending` with `actor` as creator and sole involved
    /// user. With nobody else invited, the creator's own acceptance moves it
    /// straight to `ongoing`. Each non-blank paragraph of `content` becomes
    /// one clause.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use consent_client::domain::{Template, TemplateId, UserId};
    ///
    /// let owner = UserId::new("1").unwrap();
    /// let template = Template {
    ///     id: TemplateId::new("template-1").unwrap(),
    ///     title: "Music Licensing Agreement".into(),
    ///     content: "Usage rights.\n\nPayment schedule.".into(),
    ///     description: "Standard licensing template".into(),
    ///     created_by: owner.clone(),
    ///     category: "Music".into(),
    ///     is_public: true,
    ///     created_at: Utc::now(),
    /// };
    ///
    /// let new = template.clone_as("Album licence", &owner).unwrap();
    /// assert_eq!(new.clauses.len(), 2);
    /// ```
    pub fn clone_as(&self, title: &str, actor: &UserId) -> Result<NewConsent, TemplateCloneError> {
        if !self.is_public && self.created_by != *actor {
            return Err(TemplateCloneError::Private {
                template: self.id.clone(),
            });
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(ConsentValidationError::EmptyTitle.into());
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ConsentValidationError::EmptyDescription.into());
        }

        Ok(NewConsent {
            title: title.to_owned(),
            description: description.to_owned(),
            created_by: actor.clone(),
            involved_users: vec![actor.clone()],
            clauses: paragraphs(&self.content),
        })
    }
}

fn paragraphs(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}
