//! REST adapters for the marketplace backend.
//!
//! A single [`MarketplaceHttpClient`] implements every store port; each port
//! implementation lives in its own module.

mod auth_gateway;
mod client;
mod consent_store;
mod dto;
mod template_catalogue;
mod user_directory;

pub use client::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT, HttpClientError, MarketplaceHttpClient,
};
