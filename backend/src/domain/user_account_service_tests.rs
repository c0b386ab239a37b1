//! Tests for the account service and the originating side of the saga.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::Login;
use crate::domain::ports::{
    ClientSyncPublishError, MockClientSyncPublisher, MockPasswordHasher, MockUserRepository,
};

type Service = UserAccountService<MockUserRepository, MockPasswordHasher, MockClientSyncPublisher>;

struct Mocks {
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    publisher: MockClientSyncPublisher,
}

impl Mocks {
    fn into_service(self) -> Service {
        UserAccountService::new(
            Arc::new(self.users),
            Arc::new(self.hasher),
            Arc::new(self.publisher),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("$argon2id$stub")));
    Mocks {
        users: MockUserRepository::new(),
        hasher,
        publisher: MockClientSyncPublisher::new(),
    }
}

fn new_account() -> NewAccount {
    NewAccount {
        login: Login::new("moviegoer").expect("login"),
        password: PlainPassword::new("popcorn-please").expect("password"),
    }
}

#[rstest]
#[tokio::test]
async fn creating_a_client_announces_it(mut mocks: Mocks) {
    mocks.users.expect_create().times(1).return_once(|_| Ok(()));
    mocks
        .publisher
        .expect_publish()
        .withf(|message| {
            matches!(message, ClientSyncMessage::Create(body) if body.client_login == "moviegoer")
        })
        .times(1)
        .return_once(|_| Ok(()));
    mocks.users.expect_delete().times(0);

    let user = mocks
        .into_service()
        .create(UserRole::Client, new_account())
        .await
        .expect("created");

    assert_eq!(user.role(), UserRole::Client);
    assert!(user.is_active());
}

#[rstest]
#[case(UserRole::Admin)]
#[case(UserRole::Staff)]
#[tokio::test]
async fn creating_staff_or_admins_is_not_announced(mut mocks: Mocks, #[case] role: UserRole) {
    mocks.users.expect_create().times(1).return_once(|_| Ok(()));
    mocks.publisher.expect_publish().times(0);

    let user = mocks
        .into_service()
        .create(role, new_account())
        .await
        .expect("created");

    assert_eq!(user.role(), role);
}

#[rstest]
#[tokio::test]
async fn failed_create_announcement_deletes_the_client(mut mocks: Mocks) {
    mocks.users.expect_create().times(1).return_once(|_| Ok(()));
    mocks
        .publisher
        .expect_publish()
        .times(1)
        .return_once(|_| Err(ClientSyncPublishError::unavailable("connection reset")));
    mocks
        .users
        .expect_delete()
        .withf(|role, _| *role == UserRole::Client)
        .times(1)
        .return_once(|_, _| Ok(()));

    let error = mocks
        .into_service()
        .create(UserRole::Client, new_account())
        .await
        .expect_err("not synchronised");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn duplicate_login_is_a_conflict(mut mocks: Mocks) {
    mocks
        .users
        .expect_create()
        .times(1)
        .return_once(|_| Err(UserRepositoryError::duplicate_login("moviegoer")));
    mocks.publisher.expect_publish().times(0);

    let error = mocks
        .into_service()
        .create(UserRole::Client, new_account())
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d["code"].as_str()),
        Some("duplicate_login")
    );
}

#[rstest]
#[case(true, SyncStep::Activate)]
#[case(false, SyncStep::Deactivate)]
#[tokio::test]
async fn client_status_changes_are_announced(
    mut mocks: Mocks,
    #[case] active: bool,
    #[case] step: SyncStep,
) {
    let id = UserId::random();
    mocks
        .users
        .expect_set_active()
        .withf(move |_, _, flag| *flag == active)
        .times(1)
        .return_once(|_, _, _| Ok(()));
    mocks
        .publisher
        .expect_publish()
        .withf(move |message| message.step() == step && message.client_id() == id)
        .times(1)
        .return_once(|_| Ok(()));

    let service = mocks.into_service();
    let result = if active {
        service.activate(UserRole::Client, id).await
    } else {
        service.deactivate(UserRole::Client, id).await
    };

    result.expect("status changed");
}

#[rstest]
#[tokio::test]
async fn failed_activation_announcement_deactivates_again(mut mocks: Mocks) {
    let id = UserId::random();
    let mut sequence = mockall::Sequence::new();
    mocks
        .users
        .expect_set_active()
        .withf(|_, _, flag| *flag)
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _, _| Ok(()));
    mocks
        .publisher
        .expect_publish()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Err(ClientSyncPublishError::rejected("nack")));
    mocks
        .users
        .expect_set_active()
        .withf(|_, _, flag| !*flag)
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _, _| Ok(()));

    let error = mocks
        .into_service()
        .activate(UserRole::Client, id)
        .await
        .expect_err("not synchronised");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn staff_status_changes_stay_local(mut mocks: Mocks) {
    mocks
        .users
        .expect_set_active()
        .times(1)
        .return_once(|_, _, _| Ok(()));
    mocks.publisher.expect_publish().times(0);

    mocks
        .into_service()
        .deactivate(UserRole::Staff, UserId::random())
        .await
        .expect("deactivated");
}

#[rstest]
#[tokio::test]
async fn update_replaces_login_and_rehashes_password(mut mocks: Mocks) {
    let existing = User::new(
        UserId::random(),
        Login::new("old_login").expect("login"),
        PasswordHash::new("$argon2id$old"),
        UserRole::Admin,
    );
    let id = existing.id();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_, _| Ok(Some(existing)));
    mocks
        .users
        .expect_update()
        .withf(|user| {
            user.login().as_str() == "new_login"
                && user.password().map(PasswordHash::as_str) == Some("$argon2id$stub")
        })
        .times(1)
        .return_once(|_| Ok(()));

    let user = mocks
        .into_service()
        .update(
            UserRole::Admin,
            AccountUpdate {
                id,
                login: Login::new("new_login").expect("login"),
                password: Some(PlainPassword::new("another-secret").expect("password")),
            },
        )
        .await
        .expect("updated");

    assert_eq!(user.login().as_str(), "new_login");
}

#[rstest]
#[tokio::test]
async fn find_by_login_reports_missing_accounts(mut mocks: Mocks) {
    mocks
        .users
        .expect_find_by_login()
        .return_once(|_, _| Ok(None));

    let error = mocks
        .into_service()
        .find_by_login(UserRole::Staff, "nobody_here".to_owned())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_of_unknown_account_is_not_found(mut mocks: Mocks) {
    let id = UserId::random();
    mocks
        .users
        .expect_delete()
        .return_once(move |_, _| Err(UserRepositoryError::not_found(id)));

    let error = mocks
        .into_service()
        .delete(UserRole::Admin, id)
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
