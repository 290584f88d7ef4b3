//! Domain primitives, aggregates and services.
//!
//! Purpose: model consents and the users around them, decide which status
//! changes are legal, and sort a user's consents into dashboard buckets.
//! Persistence lives behind the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: error payload reported to callers.
//! - Consent, ConsentStatus, authorize: the consent aggregate and its guard.
//! - partition_dashboard: bucket a user's consents.
//! - ConsentService, DirectoryService: use cases over the ports.
//! - NotificationPoller: background refresh of pending invitations.

pub mod consent;
pub mod consent_service;
pub mod dashboard;
pub mod directory_service;
pub mod error;
pub mod notifications;
pub mod pagination;
pub mod ports;
pub mod session;
pub mod template;
pub mod user;

pub use self::consent::{
    BlankIdError, Clause, Consent, ConsentAction, ConsentBuilder, ConsentDraft, ConsentId,
    ConsentStatus, ConsentValidationError, NewConsent, ParseConsentStatusError, Signature,
    TransitionEffect, TransitionError, authorize,
};
pub use self::consent_service::ConsentService;
pub use self::dashboard::{
    DashboardBuckets, partition_dashboard, pending_invitations, sent_invitations,
};
pub use self::directory_service::DirectoryService;
pub use self::error::{Error, ErrorCode};
pub use self::notifications::{
    DEFAULT_POLL_INTERVAL, InvitationSnapshot, NotificationPoller, PollerHandle,
};
pub use self::pagination::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, PageRequest};
pub use self::session::{
    AccessToken, CredentialsValidationError, LoginCredentials, Registration, Session,
};
pub use self::template::{Template, TemplateCloneError, TemplateId};
pub use self::user::{Rating, User, UserId, UserProfile, UserRole, UserValidationError};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use consent_client::domain::{ApiResult, Error};
///
/// fn refuse() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
///
/// assert!(refuse().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
