//! [`TemplateCatalogue`] over the REST API.

use async_trait::async_trait;
use reqwest::Method;

use super::MarketplaceHttpClient;
use super::dto::CloneTemplateRequest;
use crate::domain::ports::{StoreError, TemplateCatalogue, TemplateQuery};
use crate::domain::{Consent, Page, Session, Template, TemplateId};

#[async_trait]
impl TemplateCatalogue for MarketplaceHttpClient {
    async fn list(
        &self,
        session: Option<&Session>,
        query: &TemplateQuery,
    ) -> Result<Page<Template>, StoreError> {
        let mut params = vec![
            ("page", query.page.page().to_string()),
            ("limit", query.page.limit().to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        let request = self
            .request(
                Method::GET,
                self.endpoint(&["templates"]),
                session.map(Session::token),
            )
            .query(&params);
        self.fetch(request).await
    }

    async fn get(
        &self,
        session: Option<&Session>,
        id: &TemplateId,
    ) -> Result<Option<Template>, StoreError> {
        let request = self.request(
            Method::GET,
            self.endpoint(&["templates", id.as_ref()]),
            session.map(Session::token),
        );
        self.fetch_optional(request).await
    }

    async fn clone_template(
        &self,
        session: &Session,
        id: &TemplateId,
        title: &str,
    ) -> Result<Consent, StoreError> {
        let request = self
            .request(
                Method::POST,
                self.endpoint(&["templates", id.as_ref(), "clone"]),
                Some(session.token()),
            )
            .json(&CloneTemplateRequest { title });
        self.fetch(request).await
    }
}
