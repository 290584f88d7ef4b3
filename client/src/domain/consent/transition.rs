//! Status transition guard.
//!
//! | From                 | Action | Actor                  | Effect                           |
//! |----------------------|--------|------------------------|----------------------------------|
//! | `pending`            | accept | invitee, not yet signed | sign; `waiting_acceptance` once every invitee signed |
//! | `pending`            | accept | creator, no invitees   | sign; `ongoing`                  |
//! | `pending`            | reject | invitee                | remove                           |
//! | `pending`            | delete | creator                | remove                           |
//! | `waiting_acceptance` | accept | creator, not yet signed | sign; `ongoing`                 |
//!
//! Invitees are involved users other than the creator. Anything else is
//! refused without touching the consent.

use std::fmt;

use super::{Consent, ConsentStatus};
use crate::domain::UserId;

/// User-triggered action on a consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentAction {
    /// Sign the consent.
    Accept,
    /// Decline an invitation.
    Reject,
    /// Withdraw an invitation.
    Delete,
}

impl fmt::Display for ConsentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Delete => "delete",
        })
    }
}

/// What the store must do for an authorised action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// Append the actor's signature and move to `next`.
    Sign {
        /// Status after signing.
        next: ConsentStatus,
    },
    /// Remove the consent.
    Remove,
}

/// Reasons the guard refuses an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The action is not available from the current status.
    #[error("cannot {action} a consent in status {from}")]
    InvalidTransition {
        /// Current status.
        from: ConsentStatus,
        /// Requested action.
        action: ConsentAction,
    },
    /// The actor already signed this consent.
    #[error("user {actor} has already signed this consent")]
    AlreadySigned {
        /// Acting user.
        actor: UserId,
    },
    /// The actor may not perform this action.
    #[error("user {actor} is not permitted to {action} this consent")]
    NotAuthorized {
        /// Acting user.
        actor: UserId,
        /// Requested action.
        action: ConsentAction,
    },
}

impl TransitionError {
    /// Whether the refusal concerns the actor rather than the status.
    pub fn is_not_authorized(&self) -> bool {
        matches!(self, Self::NotAuthorized { .. })
    }
}

/// Decide whether `actor` may perform `action` on `consent`.
///
/// Checks run in a fixed order: users outside the consent are refused
/// first, then the status must allow the action, then the actor must hold the
/// role the action needs, and finally nobody signs twice.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use consent_client::domain::{
///     authorize, Consent, ConsentAction, ConsentId, ConsentStatus, TransitionEffect, UserId,
/// };
///
/// let creator = UserId::new("3").unwrap();
/// let invitee = UserId::new("1").unwrap();
/// let consent = Consent::builder(ConsentId::new("consent-1").unwrap(), creator.clone(), Utc::now())
///     .involved_users(vec![invitee.clone(), creator])
///     .build();
///
/// let effect = authorize(&consent, &invitee, ConsentAction::Accept).unwrap();
/// assert_eq!(
///     effect,
///     TransitionEffect::Sign { next: ConsentStatus::WaitingAcceptance }
/// );
/// ```
pub fn authorize(
    consent: &Consent,
    actor: &UserId,
    action: ConsentAction,
) -> Result<TransitionEffect, TransitionError> {
    let not_authorized = || TransitionError::NotAuthorized {
        actor: actor.clone(),
        action,
    };
    if !consent.is_visible_to(actor) {
        return Err(not_authorized());
    }

    let is_creator = consent.created_by() == actor;
    let is_invitee = !is_creator && consent.involves(actor);

    match (consent.status(), action) {
        (ConsentStatus::Pending, ConsentAction::Accept) => {
            if is_creator && consent.invitees().next().is_none() {
                ensure_unsigned(consent, actor)?;
                return Ok(TransitionEffect::Sign {
                    next: ConsentStatus::Ongoing,
                });
            }
            if !is_invitee {
                return Err(not_authorized());
            }
            ensure_unsigned(consent, actor)?;
            let outstanding = consent
                .invitees()
                .filter(|invitee| *invitee != actor && !consent.is_signed_by(invitee))
                .count();
            let next = if outstanding == 0 {
                ConsentStatus::WaitingAcceptance
            } else {
                ConsentStatus::Pending
            };
            Ok(TransitionEffect::Sign { next })
        }
        (ConsentStatus::WaitingAcceptance, ConsentAction::Accept) => {
            if !is_creator {
                return Err(not_authorized());
            }
            ensure_unsigned(consent, actor)?;
            Ok(TransitionEffect::Sign {
                next: ConsentStatus::Ongoing,
            })
        }
        (ConsentStatus::Pending, ConsentAction::Reject) => {
            if is_invitee {
                Ok(TransitionEffect::Remove)
            } else {
                Err(not_authorized())
            }
        }
        (ConsentStatus::Pending, ConsentAction::Delete) => {
            if is_creator {
                Ok(TransitionEffect::Remove)
            } else {
                Err(not_authorized())
            }
        }
        (from, _) => Err(TransitionError::InvalidTransition { from, action }),
    }
}

fn ensure_unsigned(consent: &Consent, actor: &UserId) -> Result<(), TransitionError> {
    if consent.is_signed_by(actor) {
        return Err(TransitionError::AlreadySigned {
            actor: actor.clone(),
        });
    }
    Ok(())
}
