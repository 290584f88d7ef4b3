//! Driven port for creator listings, search and profiles.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Page, PageRequest, Session, User, UserId, UserRole};

use super::StoreError;

/// Ordering of creator listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreatorSort {
    /// Highest rating first.
    #[default]
    TopRated,
    /// Most recently joined first.
    Newest,
    /// Alphabetical by name.
    Name,
}

impl CreatorSort {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopRated => "top_rated",
            Self::Newest => "newest",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for CreatorSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creator listing parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatorQuery {
    /// Only list users with this role.
    pub role: Option<UserRole>,
    /// Ordering.
    pub sort: CreatorSort,
    /// Page selection.
    pub page: PageRequest,
}

/// Free-text user search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    /// Search text; ranking is done by the store.
    pub query: String,
    /// Only match users with this role.
    pub role: Option<UserRole>,
    /// Only match users in this industry.
    pub industry: Option<String>,
}

/// Port for discovering users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// List creators.
    async fn list_creators(
        &self,
        session: Option<&Session>,
        query: &CreatorQuery,
    ) -> Result<Page<User>, StoreError>;

    /// Search users.
    async fn search(
        &self,
        session: Option<&Session>,
        search: &UserSearch,
    ) -> Result<Vec<User>, StoreError>;

    /// Fetch one user profile.
    async fn profile(
        &self,
        session: Option<&Session>,
        id: &UserId,
    ) -> Result<Option<User>, StoreError>;
}

/// Fixture directory with no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDirectory;

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn list_creators(
        &self,
        _session: Option<&Session>,
        query: &CreatorQuery,
    ) -> Result<Page<User>, StoreError> {
        Ok(Page::from_slice(&[], query.page))
    }

    async fn search(
        &self,
        _session: Option<&Session>,
        _search: &UserSearch,
    ) -> Result<Vec<User>, StoreError> {
        Ok(Vec::new())
    }

    async fn profile(
        &self,
        _session: Option<&Session>,
        _id: &UserId,
    ) -> Result<Option<User>, StoreError> {
        Ok(None)
    }
}
