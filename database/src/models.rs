use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: String,
    pub profile_id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub note: Option<String>,
    pub status: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub profile_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A profile post
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A community server
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Server {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub invite: String,
    pub invites_disabled: bool,
    pub created_at: DateTime<Utc>,
}

/// A text channel inside a server
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Channel {
    pub id: String,
    pub server_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A message posted to a channel
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub server_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub reply_id: Option<String>,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to post a message
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub server_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub reply_id: Option<String>,
}

/// A server role
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: String,
    pub server_id: String,
    pub name: String,
    pub hex_color: String,
    pub created_at: DateTime<Utc>,
}

/// A stored performance report
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub report_name: String,
    pub created_at: DateTime<Utc>,
}
