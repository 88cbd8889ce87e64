use crate::{generate_id, Account, Database, DatabaseError, NewAccount, Result};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info};

/// Account and session token operations
pub struct AccountStore<'a> {
    db: &'a Database,
}

impl<'a> AccountStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new account.
    ///
    /// Fails with a unique violation when the email or profile id is taken.
    pub async fn create(&self, account: NewAccount) -> Result<Account> {
        let id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, profile_id, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&account.profile_id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        info!("Created account {} ({})", account.profile_id, id);

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound(id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(account)
    }

    pub async fn find_by_profile_id(&self, profile_id: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE profile_id = ?")
            .bind(profile_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(account)
    }

    /// Load every account whose id is in `ids`, in no particular order
    pub async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<Account>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM accounts WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        debug!("Executing SQL: {}", builder.sql());

        let accounts = builder
            .build_query_as::<Account>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(accounts)
    }

    pub async fn update_status(&self, id: &str, status: i64) -> Result<()> {
        sqlx::query("UPDATE accounts SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Set or clear the profile note
    pub async fn update_note(&self, id: &str, note: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE accounts SET note = ? WHERE id = ?")
            .bind(note)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Persist the editable profile columns of `account`
    pub async fn update_profile(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET username = ?, bio = ?, avatar = ?, banner = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.username)
        .bind(&account.bio)
        .bind(&account.avatar)
        .bind(&account.banner)
        .bind(&account.id)
        .execute(self.db.pool())
        .await?;

        debug!("Updated profile of {}", account.id);
        Ok(())
    }

    /// The current session token of an account, if any
    pub async fn token_for(&self, account_id: &str) -> Result<Option<String>> {
        let token: Option<(String,)> =
            sqlx::query_as("SELECT token FROM tokens WHERE account_id = ?")
                .bind(account_id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(token.map(|(token,)| token))
    }

    /// Issue a fresh token, replacing any existing one
    pub async fn issue_token(&self, account_id: &str) -> Result<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();

        sqlx::query(
            r#"
            INSERT INTO tokens (account_id, token, created_at) VALUES (?, ?, ?)
            ON CONFLICT(account_id) DO UPDATE SET token = excluded.token, created_at = excluded.created_at
            "#,
        )
        .bind(account_id)
        .bind(&token)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        info!("Issued session token for {}", account_id);
        Ok(token)
    }

    /// Drop the session token of an account. Returns whether one existed.
    pub async fn revoke_token(&self, account_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tokens WHERE account_id = ?")
            .bind(account_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve a bearer token to its account
    pub async fn account_for_token(&self, token: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT accounts.* FROM accounts
            JOIN tokens ON tokens.account_id = accounts.id
            WHERE tokens.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(account)
    }
}
