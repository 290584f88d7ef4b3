//! Consent status enumeration and its wire names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a consent.
///
/// Wire names mix separators (`waiting_acceptance` but `on-hold`); both are
/// fixed by the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsentStatus {
    /// Invitation sent; invitees have not all signed yet.
    #[serde(rename = "pending")]
    Pending,
    /// Every invitee signed; the creator must counter-sign.
    #[serde(rename = "waiting_acceptance")]
    WaitingAcceptance,
    /// Fully signed and in progress.
    #[serde(rename = "ongoing")]
    Ongoing,
    /// Paused by the backend.
    #[serde(rename = "on-hold")]
    OnHold,
    /// Finished. Terminal.
    #[serde(rename = "completed")]
    Completed,
}

impl ConsentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::WaitingAcceptance,
        Self::Ongoing,
        Self::OnHold,
        Self::Completed,
    ];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WaitingAcceptance => "waiting_acceptance",
            Self::Ongoing => "ongoing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown consent status: {0}")]
pub struct ParseConsentStatusError(pub String);

impl FromStr for ConsentStatus {
    type Err = ParseConsentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseConsentStatusError(s.to_owned()))
    }
}
