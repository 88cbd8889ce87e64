use crate::{generate_id, Database, DatabaseError, Post, Result};
use chrono::Utc;
use tracing::info;

/// Profile post operations
pub struct PostStore<'a> {
    db: &'a Database,
}

impl<'a> PostStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        author_id: &str,
        content: &str,
        attachment: Option<&str>,
    ) -> Result<Post> {
        let id = generate_id();

        sqlx::query(
            "INSERT INTO posts (id, author_id, content, attachment, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(author_id)
        .bind(content)
        .bind(attachment)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        info!("Created post {} by {}", id, author_id);

        self.find(&id)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound(id))
    }

    pub async fn find(&self, id: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(post)
    }

    /// Posts by an author, newest first
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE author_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(author_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(posts)
    }

    /// Delete a post owned by `author_id`. Returns whether a row went away.
    pub async fn delete(&self, id: &str, author_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ? AND author_id = ?")
            .bind(id)
            .bind(author_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_account, setup_test_db};

    #[tokio::test]
    async fn test_post_lifecycle() {
        let (_dir, db) = setup_test_db().await;
        let alice = create_account(&db, "alice").await;
        let bob = create_account(&db, "bobby").await;
        let store = PostStore::new(&db);

        let first = store.create(&alice.id, "first", None).await.unwrap();
        let second = store
            .create(&alice.id, "second", Some("https://img.example.com/a.png"))
            .await
            .unwrap();
        assert_eq!(second.attachment.as_deref(), Some("https://img.example.com/a.png"));

        let posts = store.list_by_author(&alice.id).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

        // Only the author can delete
        assert!(!store.delete(&first.id, &bob.id).await.unwrap());
        assert!(store.delete(&first.id, &alice.id).await.unwrap());
        assert!(store.find(&first.id).await.unwrap().is_none());
    }
}
