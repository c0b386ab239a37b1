//! Layered settings shared by both deployables.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::messaging::DEFAULT_EXCHANGE;

const DEFAULT_MONGO_DATABASE: &str = "cinema";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
const APP_PORT: u16 = 8080;
const USERS_PORT: u16 = 8081;

/// Which of the two services a process runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployable {
    /// Movies, tickets and the replicated client accounts.
    App,
    /// Authoritative account store originating the client saga.
    Users,
}

impl Deployable {
    /// Listener used when `bind_addr` is not configured.
    #[must_use]
    pub const fn default_bind_addr(self) -> SocketAddr {
        let port = match self {
            Self::App => APP_PORT,
            Self::Users => USERS_PORT,
        };
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::App => "cinema-app",
            Self::Users => "cinema-users",
        }
    }
}

/// Settings loaded from CLI flags, `CINEMA_*` variables and config files.
///
/// Absent `mongo_uri` selects the in-memory repositories; absent `amqp_uri`
/// selects the in-process broker.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CINEMA")]
pub struct CinemaSettings {
    /// Socket address for the HTTP listener.
    pub bind_addr: Option<SocketAddr>,
    /// MongoDB connection string.
    pub mongo_uri: Option<String>,
    /// Database holding the `movies`, `tickets` and `users` collections.
    pub mongo_database: Option<String>,
    /// RabbitMQ connection string.
    pub amqp_uri: Option<String>,
    /// Topic exchange carrying the client saga.
    pub amqp_exchange: Option<String>,
    /// Bearer token lifetime in minutes.
    #[ortho_config(default = 60)]
    pub token_ttl_minutes: i64,
    /// Administrator created at startup when no account has this login.
    pub admin_login: Option<String>,
    /// Password for `admin_login`.
    pub admin_password: Option<String>,
}

impl CinemaSettings {
    #[must_use]
    pub fn bind_addr(&self, deployable: Deployable) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| deployable.default_bind_addr())
    }

    #[must_use]
    pub fn mongo_database(&self) -> &str {
        self.mongo_database
            .as_deref()
            .unwrap_or(DEFAULT_MONGO_DATABASE)
    }

    #[must_use]
    pub fn amqp_exchange(&self) -> &str {
        self.amqp_exchange.as_deref().unwrap_or(DEFAULT_EXCHANGE)
    }

    /// Token lifetime; non-positive values fall back to the default.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        if self.token_ttl_minutes > 0 {
            Duration::minutes(self.token_ttl_minutes)
        } else {
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
        }
    }

    /// Bootstrap administrator credentials, when both halves are set.
    #[must_use]
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        self.admin_login.as_deref().zip(self.admin_password.as_deref())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "CINEMA_BIND_ADDR",
        "CINEMA_MONGO_URI",
        "CINEMA_MONGO_DATABASE",
        "CINEMA_AMQP_URI",
        "CINEMA_AMQP_EXCHANGE",
        "CINEMA_TOKEN_TTL_MINUTES",
        "CINEMA_ADMIN_LOGIN",
        "CINEMA_ADMIN_PASSWORD",
    ];

    fn load_from_empty_args() -> CinemaSettings {
        CinemaSettings::load_from_iter([OsString::from("cinema")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_configured() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr(Deployable::App),
            Deployable::App.default_bind_addr()
        );
        assert_eq!(settings.bind_addr(Deployable::Users).port(), USERS_PORT);
        assert!(settings.mongo_uri.is_none());
        assert!(settings.amqp_uri.is_none());
        assert_eq!(settings.mongo_database(), DEFAULT_MONGO_DATABASE);
        assert_eq!(settings.amqp_exchange(), DEFAULT_EXCHANGE);
        assert_eq!(settings.token_ttl(), Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));
        assert!(settings.bootstrap_admin().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CINEMA_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("CINEMA_MONGO_URI", Some("mongodb://db:27017".to_owned())),
            ("CINEMA_MONGO_DATABASE", Some("box-office".to_owned())),
            ("CINEMA_AMQP_URI", Some("amqp://broker:5672/%2f".to_owned())),
            ("CINEMA_AMQP_EXCHANGE", Some("clients.test".to_owned())),
            ("CINEMA_TOKEN_TTL_MINUTES", Some("15".to_owned())),
            ("CINEMA_ADMIN_LOGIN", Some("root".to_owned())),
            ("CINEMA_ADMIN_PASSWORD", Some("change-me-now".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr(Deployable::Users),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(settings.mongo_uri.as_deref(), Some("mongodb://db:27017"));
        assert_eq!(settings.mongo_database(), "box-office");
        assert_eq!(settings.amqp_uri.as_deref(), Some("amqp://broker:5672/%2f"));
        assert_eq!(settings.amqp_exchange(), "clients.test");
        assert_eq!(settings.token_ttl(), Duration::minutes(15));
        assert_eq!(settings.bootstrap_admin(), Some(("root", "change-me-now")));
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn non_positive_ttls_fall_back_to_the_default(#[case] minutes: i64) {
        let settings = CinemaSettings {
            bind_addr: None,
            mongo_uri: None,
            mongo_database: None,
            amqp_uri: None,
            amqp_exchange: None,
            token_ttl_minutes: minutes,
            admin_login: None,
            admin_password: None,
        };

        assert_eq!(settings.token_ttl(), Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));
    }
}
