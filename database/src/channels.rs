use crate::{generate_id, Channel, Database, DatabaseError, Result};
use chrono::Utc;
use tracing::info;

/// Channel operations, always scoped to a server
pub struct ChannelStore<'a> {
    db: &'a Database,
}

impl<'a> ChannelStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, server_id: &str, name: &str) -> Result<Channel> {
        let id = generate_id();

        sqlx::query("INSERT INTO channels (id, server_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(server_id)
            .bind(name)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?;

        info!("Created channel {} in server {}", id, server_id);

        self.find(server_id, &id)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound(id))
    }

    /// Find a channel belonging to `server_id`
    pub async fn find(&self, server_id: &str, id: &str) -> Result<Option<Channel>> {
        let channel =
            sqlx::query_as::<_, Channel>("SELECT * FROM channels WHERE id = ? AND server_id = ?")
                .bind(id)
                .bind(server_id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(channel)
    }

    pub async fn list(&self, server_id: &str) -> Result<Vec<Channel>> {
        let channels = sqlx::query_as::<_, Channel>(
            "SELECT * FROM channels WHERE server_id = ? ORDER BY created_at, rowid",
        )
        .bind(server_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(channels)
    }

    pub async fn count(&self, server_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM channels WHERE server_id = ?")
            .bind(server_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query("UPDATE channels SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Delete a channel with its messages and pins
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted channel {}", id);
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_account, setup_test_db};
    use crate::ServerStore;

    #[tokio::test]
    async fn test_channel_lifecycle() {
        let (_dir, db) = setup_test_db().await;
        let owner = create_account(&db, "owner").await;
        let server = ServerStore::new(&db)
            .create(&owner.id, "parley", None, None)
            .await
            .unwrap();
        let other = ServerStore::new(&db)
            .create(&owner.id, "other", None, None)
            .await
            .unwrap();
        let store = ChannelStore::new(&db);

        let general = store.create(&server.id, "general").await.unwrap();
        store.create(&server.id, "random").await.unwrap();
        assert_eq!(store.count(&server.id).await.unwrap(), 2);

        let names: Vec<_> = store
            .list(&server.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["general", "random"]);

        // Lookups are scoped to the owning server
        assert!(store.find(&other.id, &general.id).await.unwrap().is_none());

        store.rename(&general.id, "lobby").await.unwrap();
        let renamed = store.find(&server.id, &general.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "lobby");

        assert!(store.delete(&general.id).await.unwrap());
        assert_eq!(store.count(&server.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_server_delete_cascades() {
        let (_dir, db) = setup_test_db().await;
        let owner = create_account(&db, "owner").await;
        let server = ServerStore::new(&db)
            .create(&owner.id, "parley", None, None)
            .await
            .unwrap();
        let store = ChannelStore::new(&db);
        store.create(&server.id, "general").await.unwrap();

        ServerStore::new(&db).delete(&server.id).await.unwrap();
        assert_eq!(store.count(&server.id).await.unwrap(), 0);
    }
}
