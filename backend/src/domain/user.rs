//! User accounts shared by the three cinema roles.
//!
//! Clients buy tickets, staff manage the programme and admins manage
//! accounts. All three share one shape; the [`UserRole`] tag decides which
//! collection discriminator and which endpoints apply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shortest accepted login.
pub const LOGIN_MIN_LEN: usize = 8;
/// Longest accepted login.
pub const LOGIN_MAX_LEN: usize = 20;

/// Validation errors raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("login must be at least {min} characters")]
    LoginTooShort { min: usize },
    #[error("login must be at most {max} characters")]
    LoginTooLong { max: usize },
    #[error("login may only contain letters, digits, '.', '_' or '-'")]
    InvalidLoginCharacters,
    #[error("unknown user role: {value}")]
    UnknownRole { value: String },
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its textual UUID form.
    ///
    /// # Examples
    /// ```
    /// use cinema::domain::UserId;
    ///
    /// assert!(UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    /// assert!(UserId::new("nope").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Allocate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account login; unique within a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Login(String);

impl Login {
    /// Validate and wrap a login.
    ///
    /// # Examples
    /// ```
    /// use cinema::domain::Login;
    ///
    /// assert!(Login::new("moviegoer").is_ok());
    /// assert!(Login::new("short").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = raw.into();
        let length = value.chars().count();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyLogin);
        }
        if length < LOGIN_MIN_LEN {
            return Err(UserValidationError::LoginTooShort { min: LOGIN_MIN_LEN });
        }
        if length > LOGIN_MAX_LEN {
            return Err(UserValidationError::LoginTooLong { max: LOGIN_MAX_LEN });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(UserValidationError::InvalidLoginCharacters);
        }
        Ok(Self(value))
    }

    /// Borrow the login text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Login {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Login> for String {
    fn from(value: Login) -> Self {
        value.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role tag distinguishing the account kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Admin,
    Staff,
}

impl UserRole {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Client, Self::Admin, Self::Staff];

    /// Lowercase tag used in tokens, URLs and the document discriminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Password hash in PHC string form. Never holds plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a `PasswordHasher`.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A user account.
///
/// ## Invariants
/// - `login` satisfies [`Login::new`].
/// - Replicated client accounts carry no password and cannot log in locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    login: Login,
    password: Option<PasswordHash>,
    active: bool,
    role: UserRole,
}

impl User {
    /// New active account with local credentials.
    #[must_use]
    pub fn new(id: UserId, login: Login, password: PasswordHash, role: UserRole) -> Self {
        Self {
            id,
            login,
            password: Some(password),
            active: true,
            role,
        }
    }

    /// Active client replica created from a lifecycle message.
    #[must_use]
    pub fn client_replica(id: UserId, login: Login) -> Self {
        Self {
            id,
            login,
            password: None,
            active: true,
            role: UserRole::Client,
        }
    }

    /// Rebuild an account from stored fields.
    #[must_use]
    pub fn restore(
        id: UserId,
        login: Login,
        password: Option<PasswordHash>,
        active: bool,
        role: UserRole,
    ) -> Self {
        Self {
            id,
            login,
            password,
            active,
            role,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn login(&self) -> &Login {
        &self.login
    }

    #[must_use]
    pub fn password(&self) -> Option<&PasswordHash> {
        self.password.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Flip the active flag.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replace the login.
    pub fn set_login(&mut self, login: Login) {
        self.login = login;
    }

    /// Replace the stored password hash.
    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = Some(password);
    }
}
