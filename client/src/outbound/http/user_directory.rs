//! [`UserDirectory`] over the REST API.

use async_trait::async_trait;
use reqwest::Method;

use super::MarketplaceHttpClient;
use crate::domain::ports::{CreatorQuery, StoreError, UserDirectory, UserSearch};
use crate::domain::{Page, Session, User, UserId};

#[async_trait]
impl UserDirectory for MarketplaceHttpClient {
    async fn list_creators(
        &self,
        session: Option<&Session>,
        query: &CreatorQuery,
    ) -> Result<Page<User>, StoreError> {
        let mut params = vec![
            ("sort", query.sort.as_str().to_owned()),
            ("page", query.page.page().to_string()),
            ("limit", query.page.limit().to_string()),
        ];
        if let Some(role) = query.role {
            params.push(("role", role.as_str().to_owned()));
        }
        let request = self
            .request(
                Method::GET,
                self.endpoint(&["creators"]),
                session.map(Session::token),
            )
            .query(&params);
        self.fetch(request).await
    }

    async fn search(
        &self,
        session: Option<&Session>,
        search: &UserSearch,
    ) -> Result<Vec<User>, StoreError> {
        let mut params = vec![("query", search.query.clone())];
        if let Some(role) = search.role {
            params.push(("role", role.as_str().to_owned()));
        }
        if let Some(industry) = &search.industry {
            params.push(("industry", industry.clone()));
        }
        let request = self
            .request(
                Method::GET,
                self.endpoint(&["search"]),
                session.map(Session::token),
            )
            .query(&params);
        self.fetch(request).await
    }

    async fn profile(
        &self,
        session: Option<&Session>,
        id: &UserId,
    ) -> Result<Option<User>, StoreError> {
        let request = self.request(
            Method::GET,
            self.endpoint(&["user", id.as_ref()]),
            session.map(Session::token),
        );
        self.fetch_optional(request).await
    }
}
