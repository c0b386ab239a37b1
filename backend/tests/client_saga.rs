//! End-to-end client lifecycle saga through the in-process broker.
//!
//! The users side and the app side keep separate in-memory stores, as the
//! two deployables keep separate databases; only the broker is shared.

use std::sync::Arc;

use cinema::domain::ports::{
    ClientSyncHandler, NewAccount, NoOpClientSyncPublisher, UserAccountCommand, UserRepository,
};
use cinema::domain::{
    ClientCompensationService, ClientReplicaService, Login, PlainPassword, SyncStep, User, UserId,
    UserAccountService, UserRole,
};
use cinema::outbound::memory::{InMemoryStore, InMemoryUserRepository};
use cinema::outbound::messaging::InProcessBroker;
use cinema::outbound::security::Argon2PasswordHasher;
use rstest::rstest;

type OriginAccounts = UserAccountService<InMemoryUserRepository, Argon2PasswordHasher, InProcessBroker>;
type LocalAccounts =
    UserAccountService<InMemoryUserRepository, Argon2PasswordHasher, NoOpClientSyncPublisher>;

struct Saga {
    broker: InProcessBroker,
    origin_users: Arc<InMemoryUserRepository>,
    replica_users: Arc<InMemoryUserRepository>,
    accounts: OriginAccounts,
    app_accounts: LocalAccounts,
}

impl Saga {
    async fn new() -> Self {
        let broker = InProcessBroker::recording();
        let hasher = Arc::new(Argon2PasswordHasher::new());
        let origin_users = Arc::new(InMemoryUserRepository::new(InMemoryStore::new()));
        let replica_users = Arc::new(InMemoryUserRepository::new(InMemoryStore::new()));

        let replicas: Arc<dyn ClientSyncHandler> = Arc::new(ClientReplicaService::new(
            Arc::clone(&replica_users),
            Arc::new(broker.clone()),
        ));
        let compensation: Arc<dyn ClientSyncHandler> =
            Arc::new(ClientCompensationService::new(Arc::clone(&origin_users)));
        broker.subscribe(&SyncStep::FORWARD, replicas).await;
        broker.subscribe(&SyncStep::ROLLBACK, compensation).await;

        Self {
            accounts: UserAccountService::new(
                Arc::clone(&origin_users),
                Arc::clone(&hasher),
                Arc::new(broker.clone()),
            ),
            app_accounts: UserAccountService::new(
                Arc::clone(&replica_users),
                hasher,
                Arc::new(NoOpClientSyncPublisher),
            ),
            broker,
            origin_users,
            replica_users,
        }
    }

    async fn register(&self, login: &str) -> User {
        self.accounts
            .create(UserRole::Client, account(login))
            .await
            .expect("client registered")
    }

    async fn steps(&self) -> Vec<SyncStep> {
        self.broker
            .published()
            .await
            .iter()
            .map(|message| message.step())
            .collect()
    }
}

fn account(login: &str) -> NewAccount {
    NewAccount {
        login: Login::new(login).expect("valid login"),
        password: PlainPassword::new("correct-horse-1").expect("valid password"),
    }
}

async fn client(repo: &InMemoryUserRepository, id: UserId) -> Option<User> {
    repo.find_by_id(UserRole::Client, &id)
        .await
        .expect("in-memory lookup")
}

#[tokio::test]
async fn registered_clients_are_replicated_without_credentials() {
    let saga = Saga::new().await;
    let alice = saga.register("alicejones").await;

    assert_eq!(saga.broker.deliver_pending().await, 1);

    let replica = client(&saga.replica_users, alice.id())
        .await
        .expect("replica created");
    assert_eq!(replica.login().as_str(), "alicejones");
    assert!(replica.is_active());
    assert!(replica.password().is_none());
    assert_eq!(saga.steps().await, vec![SyncStep::Create]);
}

#[rstest]
#[case(false)]
#[case(true)]
#[tokio::test]
async fn status_changes_follow_the_origin(#[case] reactivate: bool) {
    let saga = Saga::new().await;
    let bob = saga.register("bobbyross").await;
    saga.broker.deliver_pending().await;

    saga.accounts
        .deactivate(UserRole::Client, bob.id())
        .await
        .expect("deactivated");
    if reactivate {
        saga.accounts
            .activate(UserRole::Client, bob.id())
            .await
            .expect("activated");
    }
    saga.broker.deliver_pending().await;

    let replica = client(&saga.replica_users, bob.id())
        .await
        .expect("replica present");
    assert_eq!(replica.is_active(), reactivate);
}

#[tokio::test]
async fn replica_conflicts_roll_back_the_registration() {
    let saga = Saga::new().await;
    saga.app_accounts
        .create(UserRole::Staff, account("carolking"))
        .await
        .expect("local staff account");
    let carol = saga.register("carolking").await;

    assert_eq!(saga.broker.deliver_pending().await, 2);

    assert!(client(&saga.origin_users, carol.id()).await.is_none());
    assert!(client(&saga.replica_users, carol.id()).await.is_none());
    assert_eq!(
        saga.steps().await,
        vec![SyncStep::Create, SyncStep::CreateRollback]
    );
}

#[tokio::test]
async fn missing_replicas_restore_the_origin_status() {
    let saga = Saga::new().await;
    let dave = saga.register("davebrown").await;
    saga.broker.deliver_pending().await;
    saga.replica_users
        .delete(UserRole::Client, &dave.id())
        .await
        .expect("replica removed");

    saga.accounts
        .deactivate(UserRole::Client, dave.id())
        .await
        .expect("deactivated at the origin");
    saga.broker.deliver_pending().await;

    let origin = client(&saga.origin_users, dave.id())
        .await
        .expect("origin account kept");
    assert!(origin.is_active());
    assert_eq!(
        saga.steps().await,
        vec![
            SyncStep::Create,
            SyncStep::Deactivate,
            SyncStep::DeactivateRollback
        ]
    );
}

#[tokio::test]
async fn staff_and_admin_accounts_are_not_announced() {
    let saga = Saga::new().await;

    saga.accounts
        .create(UserRole::Staff, account("erinstaff"))
        .await
        .expect("staff created");
    saga.accounts
        .create(UserRole::Admin, account("frankadmin"))
        .await
        .expect("admin created");

    assert_eq!(saga.broker.deliver_pending().await, 0);
    assert!(saga.steps().await.is_empty());
}
