//! Authenticated session and authentication inputs.
//!
//! A [`Session`] is passed explicitly to every operation that acts on behalf
//! of a user; nothing in the crate reads ambient authentication state.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{User, UserId, UserRole};

/// Bearer token issued by the backend.
///
/// The secret is zeroed on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a token, returning `None` when it is blank.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = Zeroizing::new(token.into());
        (!token.trim().is_empty()).then_some(Self(token))
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

/// The authenticated user together with their access token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: User,
    token: AccessToken,
}

impl Session {
    /// Bind a user to the token that authenticated them.
    pub fn new(user: User, token: AccessToken) -> Self {
        Self { user, token }
    }

    /// Authenticated user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Shortcut for the authenticated user's id.
    pub fn user_id(&self) -> &UserId {
        self.user.id()
    }

    /// Access token for outbound requests.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}

/// Errors raised when authentication input is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Email was blank or lacked an `@`.
    #[error("email must be a non-empty address")]
    InvalidEmail,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Name was blank.
    #[error("name must not be empty")]
    EmptyName,
}

impl CredentialsValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "email",
            Self::EmptyPassword => "password",
            Self::EmptyName => "name",
        }
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, non-empty and contains `@`.
/// - `password` is non-empty; whitespace is preserved.
///
/// # Examples
/// ```
/// use consent_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" sarah@example.com ", "hunter2").unwrap();
/// assert_eq!(creds.email(), "sarah@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = normalise_email(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Login credentials for the new account.
    pub credentials: LoginCredentials,
    /// Requested marketplace role.
    pub role: UserRole,
}

impl Registration {
    /// Validate sign-up inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Self, CredentialsValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CredentialsValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_owned(),
            credentials: LoginCredentials::try_from_parts(email, password)?,
            role,
        })
    }
}

fn normalise_email(raw: &str) -> Result<String, CredentialsValidationError> {
    let email = raw.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(CredentialsValidationError::InvalidEmail);
    }
    Ok(email.to_owned())
}
