//! Wire DTOs for the marketplace REST API.
//!
//! Every response is wrapped in `{ data, message?, success }`. Request bodies
//! borrow from domain values so secrets are never copied into plain strings.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::domain::ports::StoreError;
use crate::domain::{
    AccessToken, ConsentStatus, LoginCredentials, NewConsent, Registration, Session, User, UserId,
};

#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub(super) data: Option<T>,
    #[serde(default)]
    pub(super) message: Option<String>,
    pub(super) success: bool,
}

impl<T> Envelope<T> {
    pub(super) fn into_data(self) -> Result<T, StoreError> {
        if !self.success {
            return Err(refusal(self.message));
        }
        self.data
            .ok_or_else(|| StoreError::decode("response envelope carried no data"))
    }
}

impl Envelope<IgnoredAny> {
    pub(super) fn into_ack(self) -> Result<(), StoreError> {
        if self.success {
            Ok(())
        } else {
            Err(refusal(self.message))
        }
    }
}

fn refusal(message: Option<String>) -> StoreError {
    StoreError::validation(
        message
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "request refused by backend".to_owned()),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateConsentRequest<'a> {
    title: &'a str,
    description: &'a str,
    created_by: &'a UserId,
    involved_users: &'a [UserId],
    status: ConsentStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    clauses: Vec<ClauseDraft<'a>>,
}

#[derive(Debug, Serialize)]
struct ClauseDraft<'a> {
    content: &'a str,
}

impl<'a> From<&'a NewConsent> for CreateConsentRequest<'a> {
    fn from(consent: &'a NewConsent) -> Self {
        Self {
            title: &consent.title,
            description: &consent.description,
            created_by: &consent.created_by,
            involved_users: &consent.involved_users,
            status: ConsentStatus::Pending,
            clauses: consent
                .clauses
                .iter()
                .map(|content| ClauseDraft { content })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ActorRequest<'a> {
    pub(super) user_id: &'a UserId,
}

#[derive(Debug, Serialize)]
pub(super) struct CloneTemplateRequest<'a> {
    pub(super) title: &'a str,
}

#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> From<&'a LoginCredentials> for LoginRequest<'a> {
    fn from(credentials: &'a LoginCredentials) -> Self {
        Self {
            email: credentials.email(),
            password: credentials.password(),
        }
    }
}

#[derive(Serialize)]
pub(super) struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: &'static str,
}

impl<'a> From<&'a Registration> for RegisterRequest<'a> {
    fn from(registration: &'a Registration) -> Self {
        Self {
            name: &registration.name,
            email: registration.credentials.email(),
            password: registration.credentials.password(),
            role: registration.role.as_str(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct AuthPayload {
    token: String,
    user: User,
}

impl AuthPayload {
    pub(super) fn into_session(self) -> Result<Session, StoreError> {
        let token = AccessToken::new(self.token)
            .ok_or_else(|| StoreError::decode("authentication response carried a blank token"))?;
        Ok(Session::new(self.user, token))
    }
}
