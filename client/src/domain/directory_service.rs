//! Read-side use cases for templates and users, plus authentication.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::domain::consent_service::map_store_error;
use crate::domain::ports::{
    AuthGateway, CreatorQuery, TemplateCatalogue, TemplateQuery, UserDirectory, UserSearch,
};
use crate::domain::{
    AccessToken, Error, LoginCredentials, Page, Registration, Session, Template, TemplateId, User,
    UserId,
};

/// Service over the template gallery, the user directory and authentication.
#[derive(Clone)]
pub struct DirectoryService {
    templates: Arc<dyn TemplateCatalogue>,
    users: Arc<dyn UserDirectory>,
    auth: Arc<dyn AuthGateway>,
}

impl DirectoryService {
    /// Create a service over the three read-side ports.
    pub fn new(
        templates: Arc<dyn TemplateCatalogue>,
        users: Arc<dyn UserDirectory>,
        auth: Arc<dyn AuthGateway>,
    ) -> Self {
        Self {
            templates,
            users,
            auth,
        }
    }

    /// Template catalogue port, shared with consent cloning.
    pub fn catalogue(&self) -> &dyn TemplateCatalogue {
        self.templates.as_ref()
    }

    /// List gallery templates.
    pub async fn templates(
        &self,
        session: Option<&Session>,
        query: &TemplateQuery,
    ) -> Result<Page<Template>, Error> {
        let page = self
            .templates
            .list(session, query)
            .await
            .map_err(map_store_error)?;
        debug!(
            category = query.category.as_deref().unwrap_or("*"),
            page = page.current_page,
            returned = page.items.len(),
            "templates listed"
        );
        Ok(page)
    }

    /// Fetch one template.
    pub async fn template(
        &self,
        session: Option<&Session>,
        id: &TemplateId,
    ) -> Result<Template, Error> {
        self.templates
            .get(session, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("template {id} not found")))
    }

    /// List creators.
    pub async fn creators(
        &self,
        session: Option<&Session>,
        query: &CreatorQuery,
    ) -> Result<Page<User>, Error> {
        self.users
            .list_creators(session, query)
            .await
            .map_err(map_store_error)
    }

    /// Search users; the backend ranks the results.
    pub async fn search(
        &self,
        session: Option<&Session>,
        search: &UserSearch,
    ) -> Result<Vec<User>, Error> {
        let text = search.query.trim();
        if text.is_empty() {
            return Err(Error::invalid_request("search query must not be blank")
                .with_details(json!({ "field": "query" })));
        }
        let normalised = UserSearch {
            query: text.to_owned(),
            ..search.clone()
        };
        self.users
            .search(session, &normalised)
            .await
            .map_err(map_store_error)
    }

    /// Fetch one user profile.
    pub async fn profile(&self, session: Option<&Session>, id: &UserId) -> Result<User, Error> {
        self.users
            .profile(session, id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let session = self
            .auth
            .login(credentials)
            .await
            .map_err(map_store_error)?;
        info!(user_id = %session.user_id(), "signed in");
        Ok(session)
    }

    /// Create an account and sign in.
    pub async fn register(&self, registration: &Registration) -> Result<Session, Error> {
        let session = self
            .auth
            .register(registration)
            .await
            .map_err(map_store_error)?;
        info!(user_id = %session.user_id(), role = %session.user().role(), "registered");
        Ok(session)
    }

    /// Rebuild a session from a stored token.
    pub async fn resume(&self, token: AccessToken) -> Result<Session, Error> {
        let user = self
            .auth
            .current_user(&token)
            .await
            .map_err(map_store_error)?;
        Ok(Session::new(user, token))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixtureTemplateCatalogue, FixtureUserDirectory, StoreError};
    use crate::domain::{UserRole, session::CredentialsValidationError};

    struct TokenGateway;

    fn sample_user() -> User {
        let created_at = Utc
            .with_ymd_and_hms(2024, 2, 1, 8, 30, 0)
            .single()
            .expect("valid timestamp");
        User::try_new(
            UserId::new("1").expect("user id"),
            "Aria Chen",
            "aria@example.com",
            UserRole::Artist,
            created_at,
        )
        .expect("valid user")
    }

    #[async_trait]
    impl AuthGateway for TokenGateway {
        async fn login(&self, credentials: &LoginCredentials) -> Result<Session, StoreError> {
            if credentials.password() == "secret" {
                let token = AccessToken::new("token-1").ok_or_else(|| StoreError::decode("token"))?;
                Ok(Session::new(sample_user(), token))
            } else {
                Err(StoreError::unauthenticated("invalid credentials"))
            }
        }

        async fn register(&self, _registration: &Registration) -> Result<Session, StoreError> {
            Err(StoreError::conflict("email already registered"))
        }

        async fn current_user(&self, token: &AccessToken) -> Result<User, StoreError> {
            if token.expose() == "token-1" {
                Ok(sample_user())
            } else {
                Err(StoreError::unauthenticated("token expired"))
            }
        }
    }

    #[fixture]
    fn service() -> DirectoryService {
        DirectoryService::new(
            Arc::new(FixtureTemplateCatalogue),
            Arc::new(FixtureUserDirectory),
            Arc::new(TokenGateway),
        )
    }

    fn credentials(password: &str) -> Result<LoginCredentials, CredentialsValidationError> {
        LoginCredentials::try_from_parts("aria@example.com", password)
    }

    #[rstest]
    #[tokio::test]
    async fn login_returns_session(service: DirectoryService) {
        let session = service
            .login(&credentials("secret").expect("credentials"))
            .await
            .expect("login succeeds");

        assert_eq!(session.user_id().as_ref(), "1");
    }

    #[rstest]
    #[tokio::test]
    async fn bad_password_is_unauthorized(service: DirectoryService) {
        let error = service
            .login(&credentials("wrong").expect("credentials"))
            .await
            .expect_err("login fails");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_registration_is_conflict(service: DirectoryService) {
        let registration =
            Registration::try_from_parts("Aria", "aria@example.com", "secret", UserRole::Artist)
                .expect("registration");

        let error = service
            .register(&registration)
            .await
            .expect_err("already registered");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case::known("token-1", true)]
    #[case::expired("token-2", false)]
    #[tokio::test]
    async fn resume_resolves_token_owner(
        service: DirectoryService,
        #[case] raw: &str,
        #[case] succeeds: bool,
    ) {
        let token = AccessToken::new(raw).expect("token");

        let outcome = service.resume(token).await;

        assert_eq!(outcome.is_ok(), succeeds);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_search_is_rejected(service: DirectoryService) {
        let error = service
            .search(
                None,
                &UserSearch {
                    query: "  ".to_owned(),
                    ..UserSearch::default()
                },
            )
            .await
            .expect_err("blank query");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.field(), Some("query"));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_profile_and_template_are_not_found(service: DirectoryService) {
        let user = UserId::new("404").expect("user id");
        let template = TemplateId::new("template-404").expect("template id");

        let profile = service.profile(None, &user).await.expect_err("no user");
        let found = service.template(None, &template).await.expect_err("no template");

        assert_eq!(profile.code(), ErrorCode::NotFound);
        assert_eq!(found.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_catalogue_lists_an_empty_first_page(service: DirectoryService) {
        let page = service
            .templates(None, &TemplateQuery::default())
            .await
            .expect("listing");

        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }
}
