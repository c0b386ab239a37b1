//! Login and self-registration.
//!
//! Unknown logins, inactive accounts, accounts without a password and wrong
//! passwords all produce the same `unauthorized` error so callers cannot
//! probe which logins exist.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, NewAccount, PasswordHasher, TokenIssuer, UserAccountCommand, UserRepository,
};
use crate::domain::user_account_service::map_user_error;
use crate::domain::{AccessToken, Error, LoginCredentials, User, UserRole};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authentication service implementing [`LoginService`].
#[derive(Clone)]
pub struct AuthenticationService<R, H, T> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    accounts: Arc<dyn UserAccountCommand>,
}

impl<R, H, T> AuthenticationService<R, H, T> {
    /// `accounts` performs registration so new clients go through the same
    /// path as accounts created by staff.
    pub fn new(
        users: Arc<R>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        accounts: Arc<dyn UserAccountCommand>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            accounts,
        }
    }
}

#[async_trait]
impl<R, H, T> LoginService for AuthenticationService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn login(
        &self,
        role: UserRole,
        credentials: LoginCredentials,
    ) -> Result<AccessToken, Error> {
        let user = self
            .users
            .find_by_login(role, credentials.login())
            .await
            .map_err(|err| map_user_error(role, err))?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        if !user.is_active() {
            debug!(%role, user_id = %user.id(), "login refused for inactive account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let verified = user
            .password()
            .is_some_and(|hash| self.hasher.verify(credentials.password(), hash));
        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self
            .tokens
            .issue(&user)
            .map_err(|err| Error::internal(err.to_string()))?;
        info!(%role, user_id = %user.id(), "login succeeded");
        Ok(token)
    }

    async fn register_client(&self, account: NewAccount) -> Result<User, Error> {
        self.accounts.create(UserRole::Client, account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockPasswordHasher, MockTokenIssuer, MockUserAccountCommand, MockUserRepository,
        TokenError,
    };
    use crate::domain::{ErrorCode, Login, PasswordHash, PlainPassword, UserId};
    use rstest::{fixture, rstest};

    type Service = AuthenticationService<MockUserRepository, MockPasswordHasher, MockTokenIssuer>;

    struct Mocks {
        users: MockUserRepository,
        hasher: MockPasswordHasher,
        tokens: MockTokenIssuer,
        accounts: MockUserAccountCommand,
    }

    impl Mocks {
        fn into_service(self) -> Service {
            AuthenticationService::new(
                Arc::new(self.users),
                Arc::new(self.hasher),
                Arc::new(self.tokens),
                Arc::new(self.accounts),
            )
        }
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            users: MockUserRepository::new(),
            hasher: MockPasswordHasher::new(),
            tokens: MockTokenIssuer::new(),
            accounts: MockUserAccountCommand::new(),
        }
    }

    fn staff(active: bool) -> User {
        let mut user = User::new(
            UserId::random(),
            Login::new("projectionist").expect("login"),
            PasswordHash::new("$argon2id$stored"),
            UserRole::Staff,
        );
        user.set_active(active);
        user
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts("projectionist", "reel-to-reel").expect("credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn valid_credentials_issue_a_token(mut mocks: Mocks) {
        let user = staff(true);
        mocks
            .users
            .expect_find_by_login()
            .withf(|role, login| *role == UserRole::Staff && login == "projectionist")
            .return_once(move |_, _| Ok(Some(user)));
        mocks
            .hasher
            .expect_verify()
            .withf(|candidate, _| candidate == "reel-to-reel")
            .return_const(true);
        mocks
            .tokens
            .expect_issue()
            .times(1)
            .return_once(|_| Ok(AccessToken::new("signed")));

        let token = mocks
            .into_service()
            .login(UserRole::Staff, credentials())
            .await
            .expect("token");

        assert_eq!(token.as_str(), "signed");
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_login_is_unauthorized(mut mocks: Mocks) {
        mocks
            .users
            .expect_find_by_login()
            .return_once(|_, _| Ok(None));
        mocks.tokens.expect_issue().times(0);

        let error = mocks
            .into_service()
            .login(UserRole::Staff, credentials())
            .await
            .expect_err("unknown");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case(true, false)]
    #[case(false, true)]
    #[tokio::test]
    async fn inactive_accounts_and_wrong_passwords_are_unauthorized(
        mut mocks: Mocks,
        #[case] active: bool,
        #[case] password_matches: bool,
    ) {
        let user = staff(active);
        mocks
            .users
            .expect_find_by_login()
            .return_once(move |_, _| Ok(Some(user)));
        mocks.hasher.expect_verify().return_const(password_matches);
        mocks.tokens.expect_issue().times(0);

        let error = mocks
            .into_service()
            .login(UserRole::Staff, credentials())
            .await
            .expect_err("refused");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn replicas_without_password_cannot_log_in(mut mocks: Mocks) {
        let replica = User::client_replica(UserId::random(), Login::new("moviegoer").expect("login"));
        mocks
            .users
            .expect_find_by_login()
            .return_once(move |_, _| Ok(Some(replica)));
        mocks.hasher.expect_verify().times(0);

        let error = mocks
            .into_service()
            .login(
                UserRole::Client,
                LoginCredentials::try_from_parts("moviegoer", "whatever").expect("credentials"),
            )
            .await
            .expect_err("no password");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn signing_failures_are_internal(mut mocks: Mocks) {
        let user = staff(true);
        mocks
            .users
            .expect_find_by_login()
            .return_once(move |_, _| Ok(Some(user)));
        mocks.hasher.expect_verify().return_const(true);
        mocks
            .tokens
            .expect_issue()
            .return_once(|_| Err(TokenError::signing("key rejected")));

        let error = mocks
            .into_service()
            .login(UserRole::Staff, credentials())
            .await
            .expect_err("signing failed");

        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn registration_creates_a_client(mut mocks: Mocks) {
        mocks
            .accounts
            .expect_create()
            .withf(|role, _| *role == UserRole::Client)
            .times(1)
            .return_once(|_, account| {
                Ok(User::new(
                    UserId::random(),
                    account.login,
                    PasswordHash::new("$argon2id$new"),
                    UserRole::Client,
                ))
            });

        let user = mocks
            .into_service()
            .register_client(NewAccount {
                login: Login::new("newcomer1").expect("login"),
                password: PlainPassword::new("first-night").expect("password"),
            })
            .await
            .expect("registered");

        assert_eq!(user.role(), UserRole::Client);
        assert_eq!(user.login().as_str(), "newcomer1");
    }
}
