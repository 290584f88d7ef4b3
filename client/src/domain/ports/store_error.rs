//! Error type shared by every port backed by the marketplace store.

use super::define_port_error;

define_port_error! {
    /// Failures reported by marketplace store adapters.
    pub enum StoreError {
        /// The store rejected the payload as malformed.
        Validation { message: String } =>
            "store rejected the request: {message}",
        /// The store refused a status change from the current status.
        InvalidTransition { message: String } =>
            "store refused the status change: {message}",
        /// The acting user may not perform the operation.
        NotAuthorized { message: String } =>
            "store refused the acting user: {message}",
        /// The session token is missing, invalid or expired.
        Unauthenticated { message: String } =>
            "store rejected the session: {message}",
        /// The referenced entity does not exist.
        NotFound { message: String } =>
            "store entity not found: {message}",
        /// The store detected a concurrent modification.
        Conflict { message: String } =>
            "store detected a conflicting change: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "store request timed out: {message}",
        /// The request failed before a response arrived or with a server error.
        Transport { message: String } =>
            "store transport failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } =>
            "store response decode failed: {message}",
    }
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}
