//! In-memory adapters used by tests and offline runs.

mod marketplace;

pub use marketplace::InMemoryMarketplace;
