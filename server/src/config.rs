use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const PORT_VAR: &str = "PARLEY_PORT";
pub const DATABASE_PATH_VAR: &str = "PARLEY_DATABASE_PATH";
pub const LOG_DIR_VAR: &str = "PARLEY_LOG_DIR";
pub const SILENT_LOGGING_VAR: &str = "PARLEY_SILENT_LOGGING";
pub const PERFORMANCE_REPORTS_VAR: &str = "PARLEY_PERFORMANCE_REPORTS";
pub const PERFORMANCE_REPORTS_MIN_MS_VAR: &str = "PARLEY_PERFORMANCE_REPORTS_MIN_MS";

const DEFAULT_PORT: u16 = 3030;
const DEFAULT_DATABASE_PATH: &str = "data/parley.db";

/// Environment-based server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_path: PathBuf,
    /// Directory for rolling log files; no file output when unset
    pub log_dir: Option<PathBuf>,
    pub silent_logging: bool,
    pub performance_reports: bool,
    pub performance_reports_min_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_dir: None,
            silent_logging: false,
            performance_reports: false,
            performance_reports_min_ms: 0,
        }
    }
}

impl ServerConfig {
    /// Load `.env` when present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", PORT_VAR, raw))?,
            None => defaults.port,
        };

        let performance_reports_min_ms = match lookup(PERFORMANCE_REPORTS_MIN_MS_VAR) {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    PERFORMANCE_REPORTS_MIN_MS_VAR, raw
                )
            })?,
            None => defaults.performance_reports_min_ms,
        };

        Ok(Self {
            port,
            database_path: lookup(DATABASE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_dir: lookup(LOG_DIR_VAR)
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            silent_logging: parse_bool(lookup(SILENT_LOGGING_VAR), defaults.silent_logging),
            performance_reports: parse_bool(
                lookup(PERFORMANCE_REPORTS_VAR),
                defaults.performance_reports,
            ),
            performance_reports_min_ms,
        })
    }

    pub fn api_config(&self) -> api::ApiConfig {
        api::ApiConfig::new()
            .with_port(self.port)
            .with_performance_reports(self.performance_reports, self.performance_reports_min_ms)
    }
}

/// `true` in any case is true, any other value is false
fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value {
        Some(raw) => raw.trim().eq_ignore_ascii_case("true"),
        None => default,
    }
}
