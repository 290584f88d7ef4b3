//! Consent marketplace client library.
//!
//! The [`domain`] module holds the consent lifecycle, dashboard partitioning
//! and the ports to the remote store. [`outbound`] adapters implement those
//! ports over HTTP or in memory, and [`inbound::cli`] drives the services from
//! the `consentctl` binary.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;

pub use settings::{ClientSettings, SettingsError};
