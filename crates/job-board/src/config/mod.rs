use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::dashboard::{FetchPolicy, SalaryPolicy};

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
    pub board: BoardApiConfig,
    pub dashboard: DashboardConfig,
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

        let base_url = env::var("JOBBOARD_API_BASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let timeout_ms = numeric_var("JOBBOARD_FETCH_TIMEOUT_MS", 8_000)?;
        let max_retries = u32::try_from(numeric_var("JOBBOARD_FETCH_RETRIES", 3)?).map_err(|_| {
            ConfigError::InvalidNumber {
                name: "JOBBOARD_FETCH_RETRIES",
            }
        })?;
        let retry_delay_ms = numeric_var("JOBBOARD_RETRY_DELAY_MS", 1_000)?;

        let undisclosed_salary = match env::var("JOBBOARD_UNDISCLOSED_SALARY") {
            Ok(raw) => SalaryPolicy::parse(&raw).ok_or(ConfigError::InvalidSalaryPolicy(raw))?,
            Err(_) => SalaryPolicy::default(),
        };
        let page_size = usize_var("JOBBOARD_PAGE_SIZE", 10)?;
        let view_ttl = Duration::from_secs(numeric_var("JOBBOARD_VIEW_TTL_SECS", 0)?);
        let session_idle = Duration::from_secs(numeric_var("JOBBOARD_SESSION_IDLE_SECS", 900)?);
        let max_sessions = usize_var("JOBBOARD_MAX_SESSIONS", 1_000)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            board: BoardApiConfig {
                base_url,
                timeout_ms,
                max_retries,
                retry_delay_ms,
            },
            dashboard: DashboardConfig {
                undisclosed_salary,
                page_size,
                view_ttl,
                session_idle,
                max_sessions,
            },
        })
    }
}

fn numeric_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(default),
    }
}

fn usize_var(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the job-board REST backend.
#[derive(Debug, Clone)]
pub struct BoardApiConfig {
    /// When unset the service falls back to its in-memory store.
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl BoardApiConfig {
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Dashboard presentation defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub undisclosed_salary: SalaryPolicy,
    pub page_size: usize,
    /// How long loaded views are served before the next read reloads them.
    pub view_ttl: Duration,
    pub session_idle: Duration,
    pub max_sessions: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
    InvalidSalaryPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
            ConfigError::InvalidSalaryPolicy(value) => write!(
                f,
                "JOBBOARD_UNDISCLOSED_SALARY must be 'include' or 'exclude', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidSalaryPolicy(_) => None,
        }
    }
}
