//! Outbound adapters implementing the domain ports.
//!
//! - **http**: reqwest client for the marketplace REST API
//! - **memory**: authoritative in-memory marketplace for tests and offline runs
//!
//! Adapters translate between domain types and transport representations.
//! Status rules stay in the domain; the memory adapter calls the same guard.

pub mod http;
pub mod memory;
