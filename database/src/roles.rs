use crate::{generate_id, Database, DatabaseError, Result, Role};
use chrono::Utc;
use tracing::{debug, info};

/// Server roles and their member assignments
pub struct RoleStore<'a> {
    db: &'a Database,
}

impl<'a> RoleStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, server_id: &str, name: &str, hex_color: &str) -> Result<Role> {
        let id = generate_id();

        sqlx::query(
            "INSERT INTO roles (id, server_id, name, hex_color, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(server_id)
        .bind(name)
        .bind(hex_color)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        info!("Created role {} in server {}", id, server_id);

        self.find(server_id, &id)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound(id))
    }

    /// Find a role belonging to `server_id`
    pub async fn find(&self, server_id: &str, id: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ? AND server_id = ?")
            .bind(id)
            .bind(server_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(role)
    }

    pub async fn list(&self, server_id: &str) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE server_id = ? ORDER BY created_at, rowid",
        )
        .bind(server_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(roles)
    }

    pub async fn count(&self, server_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles WHERE server_id = ?")
            .bind(server_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    /// Persist the name and color of `role`
    pub async fn update(&self, role: &Role) -> Result<()> {
        sqlx::query("UPDATE roles SET name = ?, hex_color = ? WHERE id = ?")
            .bind(&role.name)
            .bind(&role.hex_color)
            .bind(&role.id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted role {}", id);
        Ok(result.rows_affected() > 0)
    }

    /// Replace the members of a role.
    ///
    /// Every account must already be a member of the role's server.
    pub async fn set_members(&self, role: &Role, account_ids: &[String]) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM member_roles WHERE role_id = ?")
            .bind(&role.id)
            .execute(&mut *tx)
            .await?;

        for account_id in account_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO member_roles (role_id, account_id, server_id) VALUES (?, ?, ?)",
            )
            .bind(&role.id)
            .bind(account_id)
            .bind(&role.server_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!("Role {} now has {} members", role.id, account_ids.len());
        Ok(())
    }

    pub async fn member_ids(&self, role_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT account_id FROM member_roles WHERE role_id = ? ORDER BY rowid")
                .bind(role_id)
                .fetch_all(self.db.pool())
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
