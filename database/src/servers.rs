use crate::{generate_id, Account, Database, DatabaseError, Result, Server};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info};

/// Length of generated invite codes
pub const INVITE_LENGTH: usize = 8;

/// Random alphanumeric invite code
pub fn generate_invite() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_LENGTH)
        .map(char::from)
        .collect()
}

/// Server and membership operations
pub struct ServerStore<'a> {
    db: &'a Database,
}

impl<'a> ServerStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a server owned by `owner_id` and add the owner as its first member
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Server> {
        let id = generate_id();
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO servers (id, owner_id, name, description, icon, invite, invites_disabled, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(icon)
        .bind(generate_invite())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO server_members (server_id, account_id, joined_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(owner_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Created server {} owned by {}", id, owner_id);

        self.find(&id)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound(id))
    }

    pub async fn find(&self, id: &str) -> Result<Option<Server>> {
        let server = sqlx::query_as::<_, Server>("SELECT * FROM servers WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(server)
    }

    pub async fn find_by_invite(&self, invite: &str) -> Result<Option<Server>> {
        let server = sqlx::query_as::<_, Server>("SELECT * FROM servers WHERE invite = ?")
            .bind(invite)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(server)
    }

    /// Servers the account is a member of, in join order
    pub async fn list_for_account(&self, account_id: &str) -> Result<Vec<Server>> {
        let servers = sqlx::query_as::<_, Server>(
            r#"
            SELECT servers.* FROM servers
            JOIN server_members ON server_members.server_id = servers.id
            WHERE server_members.account_id = ?
            ORDER BY server_members.joined_at
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(servers)
    }

    /// Persist the editable columns of `server`
    pub async fn update(&self, server: &Server) -> Result<()> {
        sqlx::query("UPDATE servers SET name = ?, description = ?, icon = ? WHERE id = ?")
            .bind(&server.name)
            .bind(&server.description)
            .bind(&server.icon)
            .bind(&server.id)
            .execute(self.db.pool())
            .await?;

        debug!("Updated server {}", server.id);
        Ok(())
    }

    /// Delete a server along with its channels, messages and roles
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM servers WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted server {}", id);
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_member(&self, server_id: &str, account_id: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM server_members WHERE server_id = ? AND account_id = ?",
        )
        .bind(server_id)
        .bind(account_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count > 0)
    }

    pub async fn add_member(&self, server_id: &str, account_id: &str) -> Result<()> {
        sqlx::query("INSERT INTO server_members (server_id, account_id, joined_at) VALUES (?, ?, ?)")
            .bind(server_id)
            .bind(account_id)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?;

        info!("{} joined server {}", account_id, server_id);
        Ok(())
    }

    /// Remove a member and, through the cascade, their role assignments
    pub async fn remove_member(&self, server_id: &str, account_id: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM server_members WHERE server_id = ? AND account_id = ?")
                .bind(server_id)
                .bind(account_id)
                .execute(self.db.pool())
                .await?;

        info!("{} left server {}", account_id, server_id);
        Ok(result.rows_affected() > 0)
    }

    /// Member accounts in join order
    pub async fn members(&self, server_id: &str) -> Result<Vec<Account>> {
        let members = sqlx::query_as::<_, Account>(
            r#"
            SELECT accounts.* FROM accounts
            JOIN server_members ON server_members.account_id = accounts.id
            WHERE server_members.server_id = ?
            ORDER BY server_members.joined_at
            "#,
        )
        .bind(server_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(members)
    }

    /// Hand ownership to another member
    pub async fn transfer(&self, server_id: &str, new_owner_id: &str) -> Result<()> {
        sqlx::query("UPDATE servers SET owner_id = ? WHERE id = ?")
            .bind(new_owner_id)
            .bind(server_id)
            .execute(self.db.pool())
            .await?;

        info!("Server {} transferred to {}", server_id, new_owner_id);
        Ok(())
    }

    /// Replace the invite code and return the new one
    pub async fn regenerate_invite(&self, server_id: &str) -> Result<String> {
        let invite = generate_invite();

        sqlx::query("UPDATE servers SET invite = ? WHERE id = ?")
            .bind(&invite)
            .bind(server_id)
            .execute(self.db.pool())
            .await?;

        Ok(invite)
    }

    pub async fn set_invites_disabled(&self, server_id: &str, disabled: bool) -> Result<()> {
        sqlx::query("UPDATE servers SET invites_disabled = ? WHERE id = ?")
            .bind(disabled)
            .bind(server_id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}
