//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Retrying of read queries failing transiently.
    pub read_retry: ReadRetry,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            read_retry: ReadRetry { attempts, backoff },
        } = value;
        Self {
            read_retry: service::RetryPolicy { attempts, backoff },
        }
    }
}

/// Read retry configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ReadRetry {
    /// Maximum number of attempts, including the first one.
    #[default = 3]
    pub attempts: u32,

    /// Backoff before the first retry, growing linearly with each attempt.
    #[default(time::Duration::from_millis(100))]
    #[serde(with = "humantime_serde")]
    pub backoff: time::Duration,
}

/// Postgres configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres".to_owned()))]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Timeout of establishing a new connection.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: time::Duration,

    /// Timeout of a single SQL statement, enforced by the server.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub statement_timeout: time::Duration,

    /// Connection pool configuration.
    pub pool: Pool,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        use service::infra::postgres::{PoolConfig, Timeouts};

        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            connect_timeout,
            statement_timeout,
            pool: Pool {
                max_size,
                wait_timeout,
            },
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname),
            options: Some(format!(
                "-c statement_timeout={}",
                statement_timeout.as_millis(),
            )),
            connect_timeout: Some(connect_timeout),
            pool: Some(PoolConfig {
                max_size,
                timeouts: Timeouts {
                    wait: Some(wait_timeout),
                    ..Timeouts::default()
                },
                ..PoolConfig::default()
            }),
            ..Self::default()
        }
    }
}

/// Postgres connection pool configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Pool {
    /// Maximum number of connections in the pool.
    #[default(16)]
    pub max_size: usize,

    /// Timeout of waiting for a free connection.
    #[default(time::Duration::from_secs(5))]
    #[serde(with = "humantime_serde")]
    pub wait_timeout: time::Duration,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Config, Postgres};

    #[test]
    fn defaults_without_file() {
        let Config {
            server,
            service,
            postgres,
            log: _,
        } = Config::new("non-existent.toml").unwrap();

        assert_eq!(server.port, 8080);
        assert_eq!(service.read_retry.attempts, 3);
        assert_eq!(service.read_retry.backoff, Duration::from_millis(100));
        assert_eq!(postgres.pool.max_size, 16);
    }

    #[test]
    fn maps_timeouts_into_postgres_config() {
        let conf = service::infra::postgres::Config::from(Postgres::default());

        assert_eq!(
            conf.options.as_deref(),
            Some("-c statement_timeout=10000"),
        );
        assert_eq!(conf.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(conf.password.as_deref(), Some("postgres"));
        let pool = conf.pool.unwrap();
        assert_eq!(pool.max_size, 16);
        assert_eq!(pool.timeouts.wait, Some(Duration::from_secs(5)));
    }
}
