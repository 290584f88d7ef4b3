//! Driven port for the template gallery.

use async_trait::async_trait;

use crate::domain::{Consent, Page, PageRequest, Session, Template, TemplateId};

use super::StoreError;

/// Gallery listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateQuery {
    /// Only return templates in this category.
    pub category: Option<String>,
    /// Page selection.
    pub page: PageRequest,
}

/// Port for browsing and cloning templates.
///
/// Browsing works without a session; the store decides which private
/// templates a session may see.
#[async_trait]
pub trait TemplateCatalogue: Send + Sync {
    /// List templates visible to the caller.
    async fn list(
        &self,
        session: Option<&Session>,
        query: &TemplateQuery,
    ) -> Result<Page<Template>, StoreError>;

    /// Fetch one template.
    async fn get(
        &self,
        session: Option<&Session>,
        id: &TemplateId,
    ) -> Result<Option<Template>, StoreError>;

    /// Clone a template into a new pending consent owned by the session user.
    async fn clone_template(
        &self,
        session: &Session,
        id: &TemplateId,
        title: &str,
    ) -> Result<Consent, StoreError>;
}

/// Fixture catalogue with no templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTemplateCatalogue;

#[async_trait]
impl TemplateCatalogue for FixtureTemplateCatalogue {
    async fn list(
        &self,
        _session: Option<&Session>,
        query: &TemplateQuery,
    ) -> Result<Page<Template>, StoreError> {
        Ok(Page::from_slice(&[], query.page))
    }

    async fn get(
        &self,
        _session: Option<&Session>,
        _id: &TemplateId,
    ) -> Result<Option<Template>, StoreError> {
        Ok(None)
    }

    async fn clone_template(
        &self,
        _session: &Session,
        id: &TemplateId,
        _title: &str,
    ) -> Result<Consent, StoreError> {
        Err(StoreError::not_found(format!("template {id}")))
    }
}
