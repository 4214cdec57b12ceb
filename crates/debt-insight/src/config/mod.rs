use crate::assessment::domain::{AssessmentPolicy, BehaviorId};
use crate::export::{ExportEncoding, ReportLayout};
use chrono::Duration;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalogue: CatalogueConfig,
    pub sessions: SessionConfig,
    pub export: ReportLayout,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_dir = env::var("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let crisis_behavior = parse_var(
            "APP_CRISIS_BEHAVIOR_ID",
            AssessmentPolicy::DEFAULT_CRISIS_BEHAVIOR.0,
        )?;

        let idle_ttl_secs = parse_var(
            "APP_SESSION_TTL_SECS",
            SessionConfig::DEFAULT_IDLE_TTL_SECS,
        )?;

        let defaults = ReportLayout::default();
        let line_width = parse_var("APP_EXPORT_LINE_WIDTH", defaults.line_width)?;
        let lines_per_page = parse_var("APP_EXPORT_PAGE_LINES", defaults.lines_per_page)?;
        let encoding = match env::var("APP_EXPORT_ENCODING") {
            Ok(raw) => ExportEncoding::parse(&raw).ok_or(ConfigError::InvalidValue {
                variable: "APP_EXPORT_ENCODING",
                value: raw,
            })?,
            Err(_) => defaults.encoding,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalogue: CatalogueConfig {
                data_dir,
                policy: AssessmentPolicy {
                    crisis_behavior: BehaviorId(crisis_behavior),
                },
            },
            sessions: SessionConfig { idle_ttl_secs },
            export: ReportLayout {
                line_width,
                lines_per_page,
                encoding,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue {
                variable,
                value: raw,
            }),
        Err(_) => Ok(default),
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
}

/// Where the static catalogue lives and how its content drives control flow.
#[derive(Debug, Clone)]
pub struct CatalogueConfig {
    pub data_dir: PathBuf,
    pub policy: AssessmentPolicy,
}

/// In-memory session retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seconds a session may sit idle before it is evicted; `0` keeps sessions forever.
    pub idle_ttl_secs: u64,
}

impl SessionConfig {
    pub const DEFAULT_IDLE_TTL_SECS: u64 = 3600;

    pub fn idle_ttl(&self) -> Option<Duration> {
        if self.idle_ttl_secs == 0 {
            return None;
        }
        Duration::from_std(std::time::Duration::from_secs(self.idle_ttl_secs)).ok()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidValue {
        variable: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { variable, value } => {
                write!(f, "{variable} has unsupported value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
