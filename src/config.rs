//! Runtime configuration from environment variables and CLI flags

use crate::analytics_core::matcher::DEFAULT_TIME_THRESHOLD_SECS;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8080/v1/graphql";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendType {
    Json,
    Sqlite,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Json => "json",
            BackendType::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the analytics runtime
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Envio HyperIndex GraphQL endpoint
    pub graphql_endpoint: String,

    /// Export backend selected with `--backend`
    pub backend: BackendType,

    /// JSON export directory or SQLite database file, depending on backend
    pub output_path: PathBuf,

    /// Trailing window for performance and copy-trade analysis
    pub analysis_days: u32,

    /// Maximum gap between a reference trade and its copy
    pub time_threshold_secs: u64,

    /// Trade row limit for copy-trade and export queries
    pub query_limit: usize,

    pub http_timeout_secs: u64,

    pub dry_run: bool,
}

impl AnalyticsConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `ENVIO_GRAPHQL_ENDPOINT` (default: http://localhost:8080/v1/graphql)
    /// - `COPYFLOW_OUTPUT_DIR` (default: ./data) - used with `--backend json`
    /// - `COPYFLOW_DB_PATH` (default: data/copyflow.db) - used with `--backend sqlite`
    /// - `ANALYSIS_DAYS` (default: 7)
    /// - `COPY_TIME_THRESHOLD_SECS` (default: 300)
    /// - `TRADE_QUERY_LIMIT` (default: 1000)
    /// - `HTTP_TIMEOUT_SECS` (default: 30)
    /// - `EXPORT_DRY_RUN` (default: false)
    pub fn from_env(backend: BackendType) -> Result<Self, ConfigError> {
        let graphql_endpoint =
            env::var("ENVIO_GRAPHQL_ENDPOINT").unwrap_or_else(|_| DEFAULT_GRAPHQL_ENDPOINT.to_string());

        if !graphql_endpoint.starts_with("http://") && !graphql_endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "ENVIO_GRAPHQL_ENDPOINT must start with http:// or https://".to_string(),
            ));
        }

        let output_path = match backend {
            BackendType::Sqlite => env::var("COPYFLOW_DB_PATH").unwrap_or_else(|_| "data/copyflow.db".to_string()),
            BackendType::Json => env::var("COPYFLOW_OUTPUT_DIR").unwrap_or_else(|_| "./data".to_string()),
        };

        let analysis_days = env::var("ANALYSIS_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7);

        if analysis_days == 0 {
            return Err(ConfigError::InvalidValue(
                "ANALYSIS_DAYS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            graphql_endpoint,
            backend,
            output_path: output_path.into(),
            analysis_days,
            time_threshold_secs: env::var("COPY_TIME_THRESHOLD_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIME_THRESHOLD_SECS),
            query_limit: env::var("TRADE_QUERY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            dry_run: env::var("EXPORT_DRY_RUN")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse::<bool>()
                .unwrap_or(false),
        })
    }

    pub fn parse_backend_from_args(args: &[String]) -> BackendType {
        if let Some(idx) = args.iter().position(|x| x == "--backend") {
            match args.get(idx + 1).map(|s| s.as_str()) {
                Some("sqlite") => return BackendType::Sqlite,
                Some("json") => return BackendType::Json,
                Some(other) => log::warn!("Unknown backend '{}', defaulting to json", other),
                None => {}
            }
        }

        BackendType::Json // Default to JSON
    }
}
