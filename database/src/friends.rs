use crate::{Account, Database, Result};
use chrono::Utc;
use tracing::info;

/// Friend requests and friendships between accounts
pub struct FriendStore<'a> {
    db: &'a Database,
}

impl<'a> FriendStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Whether `from_id` has a pending request to `to_id`
    pub async fn has_request(&self, from_id: &str, to_id: &str) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM friend_requests WHERE from_id = ? AND to_id = ?")
                .bind(from_id)
                .bind(to_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(count > 0)
    }

    pub async fn create_request(&self, from_id: &str, to_id: &str) -> Result<()> {
        sqlx::query("INSERT INTO friend_requests (from_id, to_id, created_at) VALUES (?, ?, ?)")
            .bind(from_id)
            .bind(to_id)
            .bind(Utc::now())
            .execute(self.db.pool())
            .await?;

        info!("Friend request {} -> {}", from_id, to_id);
        Ok(())
    }

    /// Remove a pending request. Returns whether one existed.
    pub async fn delete_request(&self, from_id: &str, to_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM friend_requests WHERE from_id = ? AND to_id = ?")
            .bind(from_id)
            .bind(to_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn are_friends(&self, account_id: &str, friend_id: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM friendships WHERE account_id = ? AND friend_id = ?",
        )
        .bind(account_id)
        .bind(friend_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count > 0)
    }

    /// Accept the request from `requester_id` to `account_id`.
    ///
    /// Stores the friendship in both directions and clears requests
    /// either way in one transaction.
    pub async fn add_friendship(&self, account_id: &str, requester_id: &str) -> Result<()> {
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        for (a, b) in [(account_id, requester_id), (requester_id, account_id)] {
            sqlx::query(
                "INSERT OR IGNORE INTO friendships (account_id, friend_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(a)
            .bind(b)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM friend_requests WHERE from_id = ? AND to_id = ?")
                .bind(a)
                .bind(b)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!("{} and {} are now friends", account_id, requester_id);
        Ok(())
    }

    /// Remove a friendship in both directions. Returns whether it existed.
    pub async fn remove_friendship(&self, account_id: &str, friend_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE (account_id = ? AND friend_id = ?) OR (account_id = ? AND friend_id = ?)
            "#,
        )
        .bind(account_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(account_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_friends(&self, account_id: &str) -> Result<Vec<Account>> {
        let friends = sqlx::query_as::<_, Account>(
            r#"
            SELECT accounts.* FROM accounts
            JOIN friendships ON friendships.friend_id = accounts.id
            WHERE friendships.account_id = ?
            ORDER BY friendships.created_at
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(friends)
    }

    /// Accounts that have sent `account_id` a request
    pub async fn list_pending(&self, account_id: &str) -> Result<Vec<Account>> {
        let pending = sqlx::query_as::<_, Account>(
            r#"
            SELECT accounts.* FROM accounts
            JOIN friend_requests ON friend_requests.from_id = accounts.id
            WHERE friend_requests.to_id = ?
            ORDER BY friend_requests.created_at
            "#,
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_account, setup_test_db};

    #[tokio::test]
    async fn test_request_and_accept() {
        let (_dir, db) = setup_test_db().await;
        let alice = create_account(&db, "alice").await;
        let bob = create_account(&db, "bobby").await;
        let store = FriendStore::new(&db);

        store.create_request(&alice.id, &bob.id).await.unwrap();
        assert!(store.has_request(&alice.id, &bob.id).await.unwrap());
        assert!(!store.has_request(&bob.id, &alice.id).await.unwrap());

        let pending = store.list_pending(&bob.id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, alice.id);

        store.add_friendship(&bob.id, &alice.id).await.unwrap();
        assert!(store.are_friends(&alice.id, &bob.id).await.unwrap());
        assert!(store.are_friends(&bob.id, &alice.id).await.unwrap());
        assert!(!store.has_request(&alice.id, &bob.id).await.unwrap());
        assert!(store.list_pending(&bob.id).await.unwrap().is_empty());

        let friends = store.list_friends(&alice.id).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, bob.id);
    }

    #[tokio::test]
    async fn test_reject_and_remove() {
        let (_dir, db) = setup_test_db().await;
        let alice = create_account(&db, "alice").await;
        let bob = create_account(&db, "bobby").await;
        let store = FriendStore::new(&db);

        store.create_request(&alice.id, &bob.id).await.unwrap();
        assert!(store.delete_request(&alice.id, &bob.id).await.unwrap());
        assert!(!store.delete_request(&alice.id, &bob.id).await.unwrap());

        store.add_friendship(&alice.id, &bob.id).await.unwrap();
        assert!(store.remove_friendship(&bob.id, &alice.id).await.unwrap());
        assert!(!store.are_friends(&alice.id, &bob.id).await.unwrap());
        assert!(!store.are_friends(&bob.id, &alice.id).await.unwrap());
        assert!(!store.remove_friendship(&bob.id, &alice.id).await.unwrap());
    }
}
