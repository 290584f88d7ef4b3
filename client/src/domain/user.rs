//! Marketplace user model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum UserValidationError {
    /// The identifier was empty.
    EmptyId,
    /// The identifier carried leading or trailing whitespace.
    InvalidId,
    /// The user name was blank.
    EmptyName,
    /// The rating fell outside `0..=5` or was not finite.
    RatingOutOfRange {
        /// Offending value.
        value: f64,
    },
    /// The role string did not name a known role.
    UnknownRole {
        /// Offending value.
        value: String,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::RatingOutOfRange { value } => {
                write!(f, "rating must be between {RATING_MIN} and {RATING_MAX} (got {value})")
            }
            Self::UnknownRole { value } => {
                write!(f, "role must be artist, company or admin (got {value})")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier issued by the backend.
///
/// Identifiers are opaque: the backend hands out short numeric strings, so
/// the only constraints are non-emptiness and no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Marketplace role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Individual creator offering work.
    Artist,
    /// Organisation commissioning work.
    Company,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Wire representation used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Company => "company",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artist" => Ok(Self::Artist),
            "company" => Ok(Self::Company),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole {
                value: s.to_owned(),
            }),
        }
    }
}

/// Lowest permitted rating.
pub const RATING_MIN: f64 = 0.0;
/// Highest permitted rating.
pub const RATING_MAX: f64 = 5.0;

/// Average rating in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// Validate and construct a [`Rating`].
    pub fn new(value: f64) -> Result<Self, UserValidationError> {
        if !value.is_finite() || !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(UserValidationError::RatingOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Raw rating value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Rating {
    type Error = UserValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Marketplace user profile.
///
/// ## Invariants
/// - `id` is a valid [`UserId`].
/// - `name` is non-empty once trimmed.
/// - `rating`, when present, lies in `0..=5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
    profile: UserProfile,
    created_at: DateTime<Utc>,
}

/// Optional profile fields shown on profile and search pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Average rating.
    pub rating: Option<Rating>,
    /// Industry label, for example `Music`.
    pub industry: Option<String>,
    /// Free-text biography.
    pub bio: Option<String>,
}

impl User {
    /// Build a user from validated parts.
    pub fn try_new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            email: email.into(),
            role,
            profile: UserProfile::default(),
            created_at,
        })
    }

    /// Attach optional profile fields.
    #[must_use]
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Marketplace role.
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Optional profile fields.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Account creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    name: String,
    email: String,
    role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            role,
            profile,
            created_at,
        } = value;
        Self {
            id: id.into(),
            name,
            email,
            role,
            profile_picture: profile.profile_picture,
            rating: profile.rating.map(Rating::value),
            industry: profile.industry,
            bio: profile.bio,
            created_at,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let profile = UserProfile {
            profile_picture: value.profile_picture,
            rating: value.rating.map(Rating::new).transpose()?,
            industry: value.industry,
            bio: value.bio,
        };
        let user = Self::try_new(
            UserId::new(value.id)?,
            value.name,
            value.email,
            value.role,
            value.created_at,
        )?;
        Ok(user.with_profile(profile))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the user model.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case(" 3", UserValidationError::InvalidId)]
    #[case("3 ", UserValidationError::InvalidId)]
    fn user_id_rejects_malformed_values(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(4.8, true)]
    #[case(5.0, true)]
    #[case(5.1, false)]
    #[case(-0.5, false)]
    #[case(f64::NAN, false)]
    fn rating_enforces_bounds(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(Rating::new(value).is_ok(), valid);
    }

    #[rstest]
    #[case("artist", UserRole::Artist)]
    #[case("Company", UserRole::Company)]
    #[case(" admin ", UserRole::Admin)]
    fn role_parses_case_insensitively(#[case] raw: &str, #[case] expected: UserRole) {
        assert_eq!(raw.parse::<UserRole>(), Ok(expected));
    }

    #[rstest]
    fn decodes_backend_payload() {
        let payload = json!({
            "id": "1",
            "name": "Sarah Johnson",
            "email": "sarah.johnson@email.com",
            "role": "artist",
            "rating": 4.8,
            "industry": "Music",
            "createdAt": "2023-01-15T10:30:00Z"
        });

        let user: User = serde_json::from_value(payload).expect("valid user payload");
        assert_eq!(user.id().as_ref(), "1");
        assert_eq!(user.role(), UserRole::Artist);
        assert_eq!(user.profile().rating.map(Rating::value), Some(4.8));
        assert_eq!(user.profile().bio, None);
    }

    #[rstest]
    fn rejects_payload_with_out_of_range_rating() {
        let payload = json!({
            "id": "1",
            "name": "Sarah Johnson",
            "email": "sarah.johnson@email.com",
            "role": "artist",
            "rating": 7.0,
            "createdAt": "2023-01-15T10:30:00Z"
        });

        assert!(serde_json::from_value::<User>(payload).is_err());
    }
}
