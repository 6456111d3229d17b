use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::registration::DecisionPolicy;

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_DEV_ADMIN_PASSWORD: &str = "admin123";
/// Five years.
const MAX_SESSION_TTL_MINUTES: i64 = 5 * 365 * 24 * 60;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the registry service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub review: ReviewConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_url = env::var("REGISTRY_DATABASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let connect_attempts = parse_number("REGISTRY_CONNECT_ATTEMPTS", 30)?;
        let connect_delay_secs = parse_number("REGISTRY_CONNECT_DELAY_SECS", 5)?;

        let decision_policy = match env::var("REGISTRY_DECISION_POLICY") {
            Ok(raw) => raw
                .parse::<DecisionPolicy>()
                .map_err(|_| ConfigError::InvalidDecisionPolicy(raw))?,
            Err(_) => DecisionPolicy::default(),
        };

        let username =
            env::var("ADMIN_USERNAME").unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string());
        let password = match env::var("ADMIN_PASSWORD") {
            Ok(password) if !password.is_empty() => password,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingAdminPassword)
            }
            _ => DEFAULT_DEV_ADMIN_PASSWORD.to_string(),
        };
        let session_ttl = session_ttl(parse_number("ADMIN_SESSION_TTL_MINUTES", 480)?)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                database_url,
                connect_attempts: u32::try_from(connect_attempts.max(1)).unwrap_or(u32::MAX),
                connect_delay: Duration::from_secs(connect_delay_secs),
            },
            admin: AdminConfig {
                username,
                password,
                session_ttl,
            },
            review: ReviewConfig { decision_policy },
        })
    }
}

fn parse_number(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn session_ttl(minutes: u64) -> Result<chrono::Duration, ConfigError> {
    i64::try_from(minutes)
        .ok()
        .filter(|minutes| *minutes <= MAX_SESSION_TTL_MINUTES)
        .and_then(chrono::Duration::try_minutes)
        .ok_or_else(|| ConfigError::InvalidNumber {
            var: "ADMIN_SESSION_TTL_MINUTES",
            value: minutes.to_string(),
        })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Registration store selection and startup connection policy.
///
/// Without a `database_url` the service keeps registrations in memory.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_url: Option<String>,
    pub connect_attempts: u32,
    pub connect_delay: Duration,
}

/// Administrator credential pair and session lifetime.
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    pub session_ttl: chrono::Duration,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewConfig {
    pub decision_policy: DecisionPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str, value: String },
    InvalidDecisionPolicy(String),
    MissingAdminPassword,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer in range, found '{value}'")
            }
            ConfigError::InvalidDecisionPolicy(value) => write!(
                f,
                "REGISTRY_DECISION_POLICY must be 'final' or 'overwrite', found '{value}'"
            ),
            ConfigError::MissingAdminPassword => {
                write!(f, "ADMIN_PASSWORD must be set in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidDecisionPolicy(_)
            | ConfigError::MissingAdminPassword => None,
        }
    }
}
