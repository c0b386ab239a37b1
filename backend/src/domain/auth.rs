//! Authentication primitives: credentials, passwords and token claims.
//!
//! Inbound adapters build these from raw strings before calling a port, so
//! services only ever see validated values.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::domain::{UserId, UserRole};

/// Shortest accepted password.
pub const PASSWORD_MIN_LEN: usize = 8;
/// Longest accepted password.
pub const PASSWORD_MAX_LEN: usize = 40;

/// Errors raised when credential payloads are malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

/// A plaintext password destined for hashing. Zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Validate the length of a new password.
    ///
    /// # Examples
    /// ```
    /// use cinema::domain::PlainPassword;
    ///
    /// assert!(PlainPassword::new("correct horse").is_ok());
    /// assert!(PlainPassword::new("short").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, LoginValidationError> {
        let length = raw.chars().count();
        if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&length) {
            return Err(LoginValidationError::PasswordLength {
                min: PASSWORD_MIN_LEN,
                max: PASSWORD_MAX_LEN,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Expose the secret for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

/// Credentials presented at login.
///
/// ## Invariants
/// - `login` is trimmed and non-empty.
/// - `password` is non-empty; its length is not re-checked so accounts keep
///   working if the policy tightens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(login: &str, password: &str) -> Result<Self, LoginValidationError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(LoginValidationError::EmptyLogin);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            login: login.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    #[must_use]
    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity asserted by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub user_id: UserId,
    pub login: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl AccessClaims {
    /// Whether the token holder is the given account.
    #[must_use]
    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Signed bearer token handed to clients after login.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyLogin)]
    #[case("   ", "pw", LoginValidationError::EmptyLogin)]
    #[case("moviegoer", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] login: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(LoginCredentials::try_from_parts(login, password), Err(expected));
    }

    #[test]
    fn credentials_trim_login_but_not_password() {
        let creds = LoginCredentials::try_from_parts("  moviegoer ", " secret ").expect("valid");
        assert_eq!(creds.login(), "moviegoer");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    #[case(7, false)]
    #[case(8, true)]
    #[case(40, true)]
    #[case(41, false)]
    fn password_length_policy(#[case] length: usize, #[case] accepted: bool) {
        let raw = "p".repeat(length);
        assert_eq!(PlainPassword::new(&raw).is_ok(), accepted);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let password = PlainPassword::new("hunter2hunter2").expect("valid");
        let token = AccessToken::new("eyJhbGciOi.secret.sig");
        assert!(!format!("{password:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("secret"));
    }
}
