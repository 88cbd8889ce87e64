use crate::{Database, Report, Result};
use chrono::Utc;
use tracing::debug;

/// Performance report rows
pub struct ReportStore<'a> {
    db: &'a Database,
}

impl<'a> ReportStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, report_name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO reports (report_name, created_at) VALUES (?, ?)")
            .bind(report_name)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?;

        debug!("Stored report: {}", report_name);
        Ok(result.last_insert_rowid())
    }

    /// Most recent reports first
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Report>> {
        let reports =
            sqlx::query_as::<_, Report>("SELECT * FROM reports ORDER BY id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?;

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_test_db;

    #[tokio::test]
    async fn test_reports() {
        let (_dir, db) = setup_test_db().await;
        let store = ReportStore::new(&db);

        let first = store.create("GET /api/v1/me took 3ms.").await.unwrap();
        let second = store.create("POST /api/v1/login took 40ms.").await.unwrap();
        assert!(second > first);

        let recent = store.list_recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].report_name, "POST /api/v1/login took 40ms.");
    }
}
