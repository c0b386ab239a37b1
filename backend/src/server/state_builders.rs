//! Wiring of repositories, services and saga adapters for each deployable.
//!
//! Storage and broker are chosen from [`CinemaSettings`]: MongoDB and
//! RabbitMQ when their URIs are configured, the in-memory store and the
//! in-process broker otherwise.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::DefaultClock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ClientSyncHandler, ClientSyncPublishError, ClientSyncPublisher, MovieRepository, NewAccount,
    NoOpClientSyncPublisher, TicketRepository, UserAccountCommand, UserAccountQuery,
    UserRepository,
};
use crate::domain::{
    AuthenticationService, ClientCompensationService, ClientReplicaService, ClientSyncMessage,
    ErrorCode, Login, MovieService, PlainPassword, SyncStep, TicketService, UserAccountService,
    UserRole,
};
use crate::inbound::amqp::{spawn_consumers, DEFAULT_PREFETCH};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::{CinemaState, HttpState, HttpStatePorts};
use crate::outbound::memory::{
    InMemoryMovieRepository, InMemoryStore, InMemoryTicketRepository, InMemoryUserRepository,
};
use crate::outbound::messaging::{
    AmqpBroker, AmqpClientSyncPublisher, BrokerError, ClientSyncTopology, InProcessBroker,
};
use crate::outbound::persistence::{
    MongoConfigError, MongoMovieRepository, MongoStore, MongoTicketRepository, MongoUserRepository,
};
use crate::outbound::security::{Argon2PasswordHasher, JwsResourceSigner, JwtTokenService};

use super::readiness::MongoReadiness;
use super::token_config::SigningKey;
use super::{AppDependencies, CinemaSettings, Deployable};

/// Errors raised while wiring a deployable.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Mongo(#[from] MongoConfigError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("failed to create bootstrap administrator: {message}")]
    Bootstrap { message: String },
}

/// Everything a running deployable owns besides its listener.
pub struct ServerParts {
    pub dependencies: AppDependencies,
    /// Saga consumer tasks; they run until the process exits.
    pub consumers: Vec<JoinHandle<()>>,
}

enum Storage {
    Mongo(MongoStore),
    Memory(InMemoryStore),
}

async fn connect_storage(settings: &CinemaSettings) -> Result<Storage, MongoConfigError> {
    match settings.mongo_uri.as_deref() {
        Some(uri) => {
            let store = MongoStore::connect(uri, settings.mongo_database()).await?;
            Ok(Storage::Mongo(store))
        }
        None => {
            warn!("CINEMA_MONGO_URI not set; using in-memory repositories (dev only)");
            Ok(Storage::Memory(InMemoryStore::new()))
        }
    }
}

enum Messaging {
    Amqp(Arc<AmqpBroker>),
    InProcess(InProcessBroker),
}

impl Messaging {
    async fn connect(settings: &CinemaSettings) -> Result<Self, BrokerError> {
        let topology = ClientSyncTopology::new(settings.amqp_exchange());
        match settings.amqp_uri.as_deref() {
            Some(uri) => {
                let broker = AmqpBroker::connect(uri, topology).await?;
                Ok(Self::Amqp(Arc::new(broker)))
            }
            None => {
                warn!("CINEMA_AMQP_URI not set; client saga stays inside this process (dev only)");
                Ok(Self::InProcess(InProcessBroker::new()))
            }
        }
    }

    async fn publisher(&self) -> Result<SagaPublisher, BrokerError> {
        match self {
            Self::Amqp(broker) => Ok(SagaPublisher::Amqp(broker.publisher().await?)),
            Self::InProcess(broker) => Ok(SagaPublisher::InProcess(broker.clone())),
        }
    }

    async fn subscribe(
        &self,
        steps: &[SyncStep],
        handler: Arc<dyn ClientSyncHandler>,
    ) -> Vec<JoinHandle<()>> {
        match self {
            Self::Amqp(broker) => spawn_consumers(Arc::clone(broker), steps, handler, DEFAULT_PREFETCH),
            Self::InProcess(broker) => {
                broker.subscribe(steps, handler).await;
                vec![broker.spawn_dispatcher()]
            }
        }
    }
}

/// Publisher chosen at startup.
enum SagaPublisher {
    Amqp(AmqpClientSyncPublisher),
    InProcess(InProcessBroker),
}

#[async_trait]
impl ClientSyncPublisher for SagaPublisher {
    async fn publish(&self, message: &ClientSyncMessage) -> Result<(), ClientSyncPublishError> {
        match self {
            Self::Amqp(publisher) => publisher.publish(message).await,
            Self::InProcess(broker) => broker.publish(message).await,
        }
    }
}

/// Hashing, token and signature adapters shared by every handler.
struct Credentials {
    hasher: Arc<Argon2PasswordHasher>,
    tokens: Arc<JwtTokenService>,
    signer: Arc<JwsResourceSigner>,
}

impl Credentials {
    fn new(settings: &CinemaSettings, key: &SigningKey) -> Self {
        Self {
            hasher: Arc::new(Argon2PasswordHasher::new()),
            tokens: Arc::new(JwtTokenService::new(
                key.as_bytes(),
                settings.token_ttl(),
                Arc::new(DefaultClock),
            )),
            signer: Arc::new(JwsResourceSigner::new(key.as_bytes())),
        }
    }

    fn http_state<U, A>(&self, users: Arc<U>, accounts: Arc<A>) -> HttpState
    where
        U: UserRepository + 'static,
        A: UserAccountCommand + UserAccountQuery + 'static,
    {
        let registrar: Arc<dyn UserAccountCommand> = accounts.clone();
        let login = Arc::new(AuthenticationService::new(
            users,
            Arc::clone(&self.hasher),
            Arc::clone(&self.tokens),
            registrar,
        ));
        HttpState::new(HttpStatePorts {
            login,
            accounts: accounts.clone(),
            accounts_query: accounts,
            tokens: self.tokens.clone(),
            signer: self.signer.clone(),
        })
    }
}

async fn bootstrap_admin(
    settings: &CinemaSettings,
    accounts: &dyn UserAccountCommand,
) -> Result<(), StartupError> {
    let Some((login, password)) = settings.bootstrap_admin() else {
        return Ok(());
    };
    let bootstrap_error = |message: String| StartupError::Bootstrap { message };
    let account = NewAccount {
        login: Login::new(login).map_err(|err| bootstrap_error(err.to_string()))?,
        password: PlainPassword::new(password).map_err(|err| bootstrap_error(err.to_string()))?,
    };
    match accounts.create(UserRole::Admin, account).await {
        Ok(admin) => {
            info!(user_id = %admin.id(), login, "bootstrap administrator created");
            Ok(())
        }
        Err(err) if err.code() == ErrorCode::Conflict => {
            debug!(login, "bootstrap administrator already exists");
            Ok(())
        }
        Err(err) => Err(bootstrap_error(err.to_string())),
    }
}

struct Repositories<M, T, U> {
    movies: Arc<M>,
    tickets: Arc<T>,
    users: Arc<U>,
}

async fn wire_app<M, T, U>(
    settings: &CinemaSettings,
    messaging: Messaging,
    credentials: Credentials,
    repositories: Repositories<M, T, U>,
    health_state: HealthState,
) -> Result<ServerParts, StartupError>
where
    M: MovieRepository + 'static,
    T: TicketRepository + 'static,
    U: UserRepository + 'static,
{
    let Repositories {
        movies,
        tickets,
        users,
    } = repositories;

    // Local staff and admins only; the app never originates the saga.
    let accounts = Arc::new(UserAccountService::new(
        Arc::clone(&users),
        Arc::clone(&credentials.hasher),
        Arc::new(NoOpClientSyncPublisher),
    ));
    bootstrap_admin(settings, accounts.as_ref()).await?;
    let http_state = credentials.http_state(Arc::clone(&users), accounts);

    let movie_service = Arc::new(MovieService::new(Arc::clone(&movies)));
    let ticket_service = Arc::new(TicketService::new(tickets, movies, Arc::clone(&users)));
    let cinema_state = CinemaState {
        movies: movie_service.clone(),
        movies_query: movie_service,
        tickets: ticket_service.clone(),
        tickets_query: ticket_service,
    };

    let replicas: Arc<dyn ClientSyncHandler> = Arc::new(ClientReplicaService::new(
        users,
        Arc::new(messaging.publisher().await?),
    ));
    let consumers = messaging.subscribe(&SyncStep::FORWARD, replicas).await;

    Ok(ServerParts {
        dependencies: AppDependencies {
            deployable: Deployable::App,
            health_state: web::Data::new(health_state),
            http_state: web::Data::new(http_state),
            cinema_state: Some(web::Data::new(cinema_state)),
        },
        consumers,
    })
}

async fn wire_users<U>(
    settings: &CinemaSettings,
    messaging: Messaging,
    credentials: Credentials,
    users: Arc<U>,
    health_state: HealthState,
) -> Result<ServerParts, StartupError>
where
    U: UserRepository + 'static,
{
    let accounts = Arc::new(UserAccountService::new(
        Arc::clone(&users),
        Arc::clone(&credentials.hasher),
        Arc::new(messaging.publisher().await?),
    ));
    bootstrap_admin(settings, accounts.as_ref()).await?;
    let http_state = credentials.http_state(Arc::clone(&users), accounts);

    let compensation: Arc<dyn ClientSyncHandler> =
        Arc::new(ClientCompensationService::new(users));
    let consumers = messaging.subscribe(&SyncStep::ROLLBACK, compensation).await;

    Ok(ServerParts {
        dependencies: AppDependencies {
            deployable: Deployable::Users,
            health_state: web::Data::new(health_state),
            http_state: web::Data::new(http_state),
            cinema_state: None,
        },
        consumers,
    })
}

/// Connect storage and broker, then wire the services of `deployable`.
///
/// # Errors
///
/// Fails when MongoDB or RabbitMQ is configured but unreachable, or when the
/// bootstrap administrator cannot be created.
pub async fn build_server_parts(
    deployable: Deployable,
    settings: &CinemaSettings,
    key: &SigningKey,
) -> Result<ServerParts, StartupError> {
    let messaging = Messaging::connect(settings).await?;
    assemble(deployable, settings, key, messaging).await
}

/// Wire `deployable` onto a broker shared with other deployables in the
/// same process, ignoring `amqp_uri`.
///
/// Running `cinema-users` and `cinema-app` on one [`InProcessBroker`] lets
/// registrations reach the app's replicas without RabbitMQ.
///
/// # Errors
///
/// Fails when MongoDB is configured but unreachable, or when the bootstrap
/// administrator cannot be created.
pub async fn build_server_parts_with_broker(
    deployable: Deployable,
    settings: &CinemaSettings,
    key: &SigningKey,
    broker: InProcessBroker,
) -> Result<ServerParts, StartupError> {
    assemble(deployable, settings, key, Messaging::InProcess(broker)).await
}

async fn assemble(
    deployable: Deployable,
    settings: &CinemaSettings,
    key: &SigningKey,
    messaging: Messaging,
) -> Result<ServerParts, StartupError> {
    let credentials = Credentials::new(settings, key);
    let storage = connect_storage(settings).await?;
    match (deployable, storage) {
        (Deployable::App, Storage::Mongo(store)) => {
            let health_state =
                HealthState::new().with_check(Arc::new(MongoReadiness::new(store.clone())));
            let repositories = Repositories {
                movies: Arc::new(MongoMovieRepository::new(store.clone())),
                tickets: Arc::new(MongoTicketRepository::new(store.clone())),
                users: Arc::new(MongoUserRepository::new(store)),
            };
            wire_app(settings, messaging, credentials, repositories, health_state).await
        }
        (Deployable::App, Storage::Memory(store)) => {
            let repositories = Repositories {
                movies: Arc::new(InMemoryMovieRepository::new(store.clone())),
                tickets: Arc::new(InMemoryTicketRepository::new(store.clone())),
                users: Arc::new(InMemoryUserRepository::new(store)),
            };
            wire_app(settings, messaging, credentials, repositories, HealthState::new()).await
        }
        (Deployable::Users, Storage::Mongo(store)) => {
            let health_state =
                HealthState::new().with_check(Arc::new(MongoReadiness::new(store.clone())));
            let users = Arc::new(MongoUserRepository::new(store));
            wire_users(settings, messaging, credentials, users, health_state).await
        }
        (Deployable::Users, Storage::Memory(store)) => {
            let users = Arc::new(InMemoryUserRepository::new(store));
            wire_users(settings, messaging, credentials, users, HealthState::new()).await
        }
    }
}
