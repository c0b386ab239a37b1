//! Server construction and middleware wiring.

mod config;
mod readiness;
mod state_builders;
mod token_config;

pub use config::{CinemaSettings, Deployable};
pub use readiness::MongoReadiness;
pub use state_builders::{
    build_server_parts, build_server_parts_with_broker, ServerParts, StartupError,
};
pub use token_config::{
    signing_key_from_env, BuildMode, SigningKey, TokenConfigError, SIGNING_KEY_MIN_LEN,
};

use std::net::SocketAddr;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use color_eyre::eyre::{eyre, Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::{CinemaState, HttpState};
use crate::inbound::http::{configure_app, configure_users, API_PREFIX};
use crate::middleware::Trace;

/// Shared state handed to every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub deployable: Deployable,
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    /// Present for [`Deployable::App`] only.
    pub cinema_state: Option<web::Data<CinemaState>>,
}

/// Build the application for one worker.
///
/// Routes under `/api/v1` depend on the deployable; the health probes sit
/// at the root. Every request runs inside the [`Trace`] middleware.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        deployable,
        health_state,
        http_state,
        cinema_state,
    } = deps;

    let api = match deployable {
        Deployable::App => web::scope(API_PREFIX).configure(configure_app),
        Deployable::Users => web::scope(API_PREFIX).configure(configure_users),
    };

    let app = App::new()
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(health_state)
        .app_data(http_state);
    let app = match cinema_state {
        Some(cinema_state) => app.app_data(cinema_state),
        None => app,
    };

    app.wrap(Trace).service(api).service(ready).service(live)
}

/// Bind the HTTP listener and mark the deployable ready.
///
/// Signal handling is left to the caller; see [`drain`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(deps: AppDependencies, bind_addr: SocketAddr) -> std::io::Result<Server> {
    let health_state = deps.health_state.clone();
    let server = HttpServer::new(move || build_app(deps.clone()))
        .disable_signals()
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}

/// Fail the liveness probe, then stop the workers once in-flight requests
/// have finished.
pub async fn drain(health_state: &HealthState, handle: ServerHandle) {
    health_state.mark_unhealthy();
    info!("draining HTTP workers");
    handle.stop(true).await;
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Entry point shared by both binaries.
///
/// Loads settings and the signing key, wires the deployable, then serves
/// until the listener stops.
///
/// # Errors
/// Fails when configuration is invalid, when MongoDB or RabbitMQ is
/// configured but unreachable, or when the listener cannot bind.
pub async fn run(deployable: Deployable) -> Result<()> {
    init_tracing();

    let settings =
        CinemaSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let key = signing_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("failed to load signing key")?;
    let ServerParts {
        dependencies,
        consumers,
    } = build_server_parts(deployable, &settings, &key)
        .await
        .wrap_err_with(|| format!("failed to start {}", deployable.as_str()))?;

    let bind_addr = settings.bind_addr(deployable);
    let health_state = dependencies.health_state.clone();
    let server = create_server(dependencies, bind_addr)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    let handle = server.handle();
    let shutdown = tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => drain(&health_state, handle).await,
            Err(err) => warn!(error = %err, "cannot listen for shutdown signals"),
        }
    });

    info!(service = deployable.as_str(), %bind_addr, consumers = consumers.len(), "listening");
    server.await.wrap_err("HTTP server failed")?;

    shutdown.abort();
    for consumer in consumers {
        consumer.abort();
    }
    info!(service = deployable.as_str(), "stopped");
    Ok(())
}
