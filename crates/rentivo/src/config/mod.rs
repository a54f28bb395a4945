use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::Duration;

use crate::identity::DEFAULT_SESSION_TTL_MINUTES;
use crate::invoices::TransitionPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    /// Production ships structured logs; every other stage logs for a human.
    pub fn default_log_format(self) -> LogFormat {
        match self {
            AppEnvironment::Production => LogFormat::Json,
            AppEnvironment::Development | AppEnvironment::Test => LogFormat::Compact,
        }
    }

    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub domain: DomainConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("RENTIVO_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("RENTIVO_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("RENTIVO_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("RENTIVO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("RENTIVO_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat { value: raw })?,
            Err(_) => environment.default_log_format(),
        };

        let data_file = env::var("RENTIVO_DATA_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let invoice_transitions = match env::var("RENTIVO_INVOICE_TRANSITIONS") {
            Ok(raw) => TransitionPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidInvoiceTransitions { value: raw })?,
            Err(_) => TransitionPolicy::default(),
        };

        let session_ttl = match env::var("RENTIVO_SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| (1..=MAX_SESSION_TTL_MINUTES).contains(minutes))
                .map(Duration::minutes)
                .ok_or(ConfigError::InvalidSessionTtl { value: raw })?,
            Err(_) => Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            storage: StorageConfig { data_file },
            domain: DomainConfig {
                invoice_transitions,
                session_ttl,
            },
        })
    }
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
    pub format: LogFormat,
}

/// Output shape of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where the document store keeps its snapshot. `None` keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub data_file: Option<PathBuf>,
}

const MAX_SESSION_TTL_MINUTES: i64 = 366 * 24 * 60;

/// Business-rule switches.
#[derive(Debug, Clone, Copy)]
pub struct DomainConfig {
    pub invoice_transitions: TransitionPolicy,
    /// Lifetime of a bearer token, counted from login.
    pub session_ttl: Duration,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            invoice_transitions: TransitionPolicy::default(),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidInvoiceTransitions { value: String },
    InvalidSessionTtl { value: String },
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "RENTIVO_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "RENTIVO_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidInvoiceTransitions { value } => write!(
                f,
                "RENTIVO_INVOICE_TRANSITIONS must be 'permissive' or 'strict' (found '{value}')"
            ),
            ConfigError::InvalidLogFormat { value } => write!(
                f,
                "RENTIVO_LOG_FORMAT must be 'compact' or 'json' (found '{value}')"
            ),
            ConfigError::InvalidSessionTtl { value } => write!(
                f,
                "RENTIVO_SESSION_TTL_MINUTES must be a whole number of minutes between 1 and {MAX_SESSION_TTL_MINUTES} (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidInvoiceTransitions { .. }
            | ConfigError::InvalidSessionTtl { .. }
            | ConfigError::InvalidLogFormat { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
