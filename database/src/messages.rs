use crate::{generate_id, Database, DatabaseError, Message, NewMessage, Result};
use chrono::Utc;
use tracing::{debug, info};

/// Channel message and pin operations
pub struct MessageStore<'a> {
    db: &'a Database,
}

impl<'a> MessageStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, message: NewMessage) -> Result<Message> {
        let id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO messages (id, server_id, channel_id, author_id, content, reply_id, edited, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(&message.server_id)
        .bind(&message.channel_id)
        .bind(&message.author_id)
        .bind(&message.content)
        .bind(&message.reply_id)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        debug!("Created message {} in channel {}", id, message.channel_id);

        self.find(&message.channel_id, &id)
            .await?
            .ok_or_else(|| DatabaseError::RecordNotFound(id))
    }

    /// Find a message belonging to `channel_id`
    pub async fn find(&self, channel_id: &str, id: &str) -> Result<Option<Message>> {
        let message =
            sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ? AND channel_id = ?")
                .bind(id)
                .bind(channel_id)
                .fetch_optional(self.db.pool())
                .await?;

        Ok(message)
    }

    /// Replace the content and flag the message as edited
    pub async fn update_content(&self, id: &str, content: &str) -> Result<()> {
        sqlx::query("UPDATE messages SET content = ?, edited = 1 WHERE id = ?")
            .bind(content)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Delete a message; its pin goes with it
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// A window of channel history.
    ///
    /// `skip` counts back from the newest message. The window holds at most
    /// `limit` messages and is returned oldest first.
    pub async fn fetch_range(&self, channel_id: &str, skip: i64, limit: i64) -> Result<Vec<Message>> {
        let mut messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE channel_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(channel_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(self.db.pool())
        .await?;

        messages.reverse();
        Ok(messages)
    }

    pub async fn is_pinned(&self, message_id: &str) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pinned_messages WHERE message_id = ?")
                .bind(message_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(count > 0)
    }

    pub async fn pin(&self, message: &Message) -> Result<()> {
        sqlx::query(
            "INSERT INTO pinned_messages (message_id, channel_id, server_id, pinned_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.channel_id)
        .bind(&message.server_id)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        info!("Pinned message {} in channel {}", message.id, message.channel_id);
        Ok(())
    }

    /// Returns whether the message was pinned
    pub async fn unpin(&self, message_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pinned_messages WHERE message_id = ?")
            .bind(message_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_pins(&self, channel_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pinned_messages WHERE channel_id = ?")
                .bind(channel_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(count)
    }

    /// Pinned messages in pin order
    pub async fn list_pins(&self, channel_id: &str) -> Result<Vec<Message>> {
        let pins = sqlx::query_as::<_, Message>(
            r#"
            SELECT messages.* FROM messages
            JOIN pinned_messages ON pinned_messages.message_id = messages.id
            WHERE pinned_messages.channel_id = ?
            ORDER BY pinned_messages.pinned_at
            "#,
        )
        .bind(channel_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(pins)
    }
}
