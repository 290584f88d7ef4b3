//! Dashboard partitioning of a user's consents.
//!
//! The partitioner is a pure function: it filters the collection down to the
//! consents the user can see and sorts them into five buckets, preserving
//! input order. Consents matching no bucket (for example a pending invitation
//! the user sent) are left out; [`sent_invitations`] covers those.

use serde::Serialize;

use crate::domain::{Consent, ConsentStatus, UserId};

/// The five dashboard buckets for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBuckets {
    /// Consents in progress.
    pub ongoing_contracts: Vec<Consent>,
    /// Invitations the user still has to sign.
    pub contracts_to_accept: Vec<Consent>,
    /// Consents the user created that await their counter-signature.
    pub waiting_for_acceptance: Vec<Consent>,
    /// Paused consents.
    pub on_hold_contracts: Vec<Consent>,
    /// Finished consents.
    pub completed_contracts: Vec<Consent>,
}

impl DashboardBuckets {
    /// Total number of consents across every bucket.
    pub fn len(&self) -> usize {
        self.ongoing_contracts.len()
            + self.contracts_to_accept.len()
            + self.waiting_for_acceptance.len()
            + self.on_hold_contracts.len()
            + self.completed_contracts.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `consents` into dashboard buckets for `user_id`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use consent_client::domain::{partition_dashboard, Consent, ConsentId, UserId};
///
/// let creator = UserId::new("3").unwrap();
/// let invitee = UserId::new("1").unwrap();
/// let invite = Consent::builder(ConsentId::new("consent-1").unwrap(), creator.clone(), Utc::now())
///     .involved_users(vec![invitee.clone(), creator.clone()])
///     .build();
///
/// let consents = [invite];
/// assert_eq!(partition_dashboard(&invitee, &consents).contracts_to_accept.len(), 1);
/// assert!(partition_dashboard(&creator, &consents).is_empty());
/// ```
pub fn partition_dashboard(user_id: &UserId, consents: &[Consent]) -> DashboardBuckets {
    let mut buckets = DashboardBuckets::default();
    for consent in consents.iter().filter(|consent| consent.is_visible_to(user_id)) {
        let bucket = match consent.status() {
            ConsentStatus::Ongoing => &mut buckets.ongoing_contracts,
            ConsentStatus::OnHold => &mut buckets.on_hold_contracts,
            ConsentStatus::Completed => &mut buckets.completed_contracts,
            ConsentStatus::Pending if awaits_signature_from(consent, user_id) => {
                &mut buckets.contracts_to_accept
            }
            ConsentStatus::WaitingAcceptance if consent.created_by() == user_id => {
                &mut buckets.waiting_for_acceptance
            }
            ConsentStatus::Pending | ConsentStatus::WaitingAcceptance => continue,
        };
        bucket.push(consent.clone());
    }
    buckets
}

/// Pending invitations `user_id` has yet to sign.
pub fn pending_invitations(user_id: &UserId, consents: &[Consent]) -> Vec<Consent> {
    consents
        .iter()
        .filter(|consent| {
            consent.status() == ConsentStatus::Pending
                && consent.is_visible_to(user_id)
                && awaits_signature_from(consent, user_id)
        })
        .cloned()
        .collect()
}

/// Invitations `user_id` sent that nobody has fully accepted yet.
pub fn sent_invitations(user_id: &UserId, consents: &[Consent]) -> Vec<Consent> {
    consents
        .iter()
        .filter(|consent| {
            consent.status() == ConsentStatus::Pending && consent.created_by() == user_id
        })
        .cloned()
        .collect()
}

fn awaits_signature_from(consent: &Consent, user_id: &UserId) -> bool {
    consent.created_by() != user_id && !consent.is_signed_by(user_id)
}
