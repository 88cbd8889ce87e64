use database::{Database, ReportStore};
use std::time::Duration;
use tracing::{debug, warn};

/// Records slow requests as report rows
#[derive(Debug, Clone, Default)]
pub struct PerformanceReporter {
    enabled: bool,
    min_ms: u64,
}

impl PerformanceReporter {
    pub fn new(enabled: bool, min_ms: u64) -> Self {
        Self { enabled, min_ms }
    }

    /// A reporter that never records
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a request that took `elapsed` should be stored
    pub fn should_record(&self, elapsed: Duration) -> bool {
        self.enabled && elapsed.as_millis() >= u128::from(self.min_ms)
    }

    pub fn report_name(method: &str, path: &str, elapsed: Duration) -> String {
        format!("{} {} took {}ms.", method, path, elapsed.as_millis())
    }

    /// Store a report for the request when it qualifies.
    ///
    /// Failures are logged and never reach the client.
    pub async fn record(&self, db: &Database, method: &str, path: &str, elapsed: Duration) {
        if !self.should_record(elapsed) {
            return;
        }

        let name = Self::report_name(method, path, elapsed);
        debug!("Recording performance report: {}", name);

        if let Err(e) = ReportStore::new(db).create(&name).await {
            warn!("Failed to store performance report: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let reporter = PerformanceReporter::new(true, 10);
        assert!(!reporter.should_record(Duration::from_millis(9)));
        assert!(reporter.should_record(Duration::from_millis(10)));

        let disabled = PerformanceReporter::disabled();
        assert!(!disabled.should_record(Duration::from_secs(60)));
    }

    #[test]
    fn test_report_name() {
        assert_eq!(
            PerformanceReporter::report_name("GET", "/api/v1/me", Duration::from_millis(12)),
            "GET /api/v1/me took 12ms."
        );
    }
}
