use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::discovery::orchestrator::{
    OrchestratorSettings, DEFAULT_MAX_CONCURRENT_SOURCES, DEFAULT_SOURCE_TIMEOUT,
};
use crate::discovery::scoring::{ModeThresholds, RelevanceConfig};
use crate::discovery::vocabulary::{VocabularyError, VocabularyTable};

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
    pub discovery: DiscoveryConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            discovery: DiscoveryConfig::from_env()?,
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
}

/// Engine tuning: fetch bounds, vocabulary source, and scoring policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub source_timeout: Duration,
    pub max_concurrent_sources: usize,
    pub vocabulary_path: Option<PathBuf>,
    pub thresholds: ModeThresholds,
    pub relevance: RelevanceConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            max_concurrent_sources: DEFAULT_MAX_CONCURRENT_SOURCES,
            vocabulary_path: None,
            thresholds: ModeThresholds::default(),
            relevance: RelevanceConfig::default(),
        }
    }
}

impl DiscoveryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_secs: u64 = parse_var(
            "DISCOVERY_SOURCE_TIMEOUT_SECS",
            defaults.source_timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: "DISCOVERY_SOURCE_TIMEOUT_SECS",
            });
        }

        let max_concurrent_sources =
            parse_var("DISCOVERY_MAX_CONCURRENT_SOURCES", defaults.max_concurrent_sources)?;
        if max_concurrent_sources == 0 {
            return Err(ConfigError::OutOfRange {
                key: "DISCOVERY_MAX_CONCURRENT_SOURCES",
            });
        }

        let vocabulary_path = env::var("DISCOVERY_VOCABULARY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let thresholds = ModeThresholds {
            strict: parse_unit("DISCOVERY_THRESHOLD_STRICT", defaults.thresholds.strict)?,
            moderate: parse_unit("DISCOVERY_THRESHOLD_MODERATE", defaults.thresholds.moderate)?,
            loose: parse_unit("DISCOVERY_THRESHOLD_LOOSE", defaults.thresholds.loose)?,
        };

        let weights = &defaults.relevance;
        let freshness_window_hours = parse_var(
            "DISCOVERY_FRESHNESS_WINDOW_HOURS",
            weights.freshness_window_hours,
        )?;
        if freshness_window_hours == 0 {
            return Err(ConfigError::OutOfRange {
                key: "DISCOVERY_FRESHNESS_WINDOW_HOURS",
            });
        }
        let relevance = RelevanceConfig {
            coverage_weight: parse_unit("DISCOVERY_WEIGHT_COVERAGE", weights.coverage_weight)?,
            category_weight: parse_unit("DISCOVERY_WEIGHT_CATEGORY", weights.category_weight)?,
            phrase_bonus: parse_unit("DISCOVERY_WEIGHT_PHRASE", weights.phrase_bonus)?,
            remote_bonus: parse_unit("DISCOVERY_WEIGHT_REMOTE", weights.remote_bonus)?,
            compensation_bonus: parse_unit(
                "DISCOVERY_WEIGHT_COMPENSATION",
                weights.compensation_bonus,
            )?,
            freshness_bonus: parse_unit("DISCOVERY_WEIGHT_FRESHNESS", weights.freshness_bonus)?,
            freshness_window_hours,
        };

        Ok(Self {
            source_timeout: Duration::from_secs(timeout_secs),
            max_concurrent_sources,
            vocabulary_path,
            thresholds,
            relevance,
        })
    }

    pub fn settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            source_timeout: self.source_timeout,
            max_concurrent_sources: self.max_concurrent_sources,
        }
    }

    /// The configured vocabulary file, or the built-in table.
    pub fn load_vocabulary(&self) -> Result<VocabularyTable, VocabularyError> {
        match &self.vocabulary_path {
            Some(path) => VocabularyTable::from_path(path),
            None => Ok(VocabularyTable::standard()),
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        _ => Ok(default),
    }
}

fn parse_unit(key: &'static str, default: f32) -> Result<f32, ConfigError> {
    let value: f32 = parse_var(key, default)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange { key });
    }
    Ok(value)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    OutOfRange { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric (found '{value}')")
            }
            ConfigError::OutOfRange { key } => write!(f, "{key} is outside its allowed range"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::OutOfRange { .. } => None,
        }
    }
}
