use crate::{create_router, reporter::PerformanceReporter, AppState};
use std::sync::Arc;
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,
    /// Store a report row for slow requests
    pub performance_reports: bool,
    /// Minimum duration for a request to be reported
    pub performance_reports_min_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            performance_reports: false,
            performance_reports_min_ms: 0,
        }
    }
}

impl ApiConfig {
    /// Create a new API configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable performance reports for requests taking at least `min_ms`
    pub fn with_performance_reports(mut self, enabled: bool, min_ms: u64) -> Self {
        self.performance_reports = enabled;
        self.performance_reports_min_ms = min_ms;
        self
    }

    pub fn reporter(&self) -> PerformanceReporter {
        PerformanceReporter::new(self.performance_reports, self.performance_reports_min_ms)
    }
}

/// Start the API server with the given configuration
pub async fn start_server_with_config(
    db: Arc<database::Database>,
    config: ApiConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState::new(db, config.reporter());
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on {}", addr);
    info!(
        "Swagger UI available at http://localhost:{}/api/v1/swagger",
        config.port
    );
    if config.performance_reports {
        info!(
            "Performance reports enabled for requests of {}ms or more",
            config.performance_reports_min_ms
        );
    }

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::new();
        assert_eq!(config.port, 3030);
        assert!(!config.reporter().is_enabled());
    }

    #[test]
    fn test_builder() {
        let config = ApiConfig::new()
            .with_port(8080)
            .with_performance_reports(true, 25);
        assert_eq!(config.port, 8080);
        assert!(config.reporter().is_enabled());
    }
}
