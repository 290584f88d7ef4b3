//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod consent_store;
mod store_error;
mod template_catalogue;
mod user_directory;

pub use auth_gateway::AuthGateway;
#[cfg(test)]
pub use consent_store::MockConsentStore;
pub use consent_store::{ConsentFilter, ConsentStore};
pub use store_error::StoreError;
pub use template_catalogue::{FixtureTemplateCatalogue, TemplateCatalogue, TemplateQuery};
pub use user_directory::{
    CreatorQuery, CreatorSort, FixtureUserDirectory, UserDirectory, UserSearch,
};
