use chrono::{DateTime, Utc};
use database::{Account, Channel, Message, Post, Role, Server};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub profile_id: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoteRequest {
    pub note: Option<String>,
}

/// Only the keys that are present change
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostRequest {
    pub content: String,
    pub attachment: Option<String>,
}

/// Names another account by its profile id
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TargetProfileRequest {
    pub profile_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateServerRequest {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EditServerRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinServerRequest {
    pub invite: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleInvitesRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
    pub reply_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EditMessageRequest {
    pub content: String,
}

/// History window, counted back from the newest message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FetchMessagesQuery {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub name: String,
    pub color: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub members: Option<Vec<JsonValue>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignRoleRequest {
    #[schema(value_type = Vec<String>)]
    pub members: Vec<JsonValue>,
}

// ============================================================================
// Responses
// ============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub message: String,
}

/// Generic success response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Returned by register and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: String,
    pub profile_id: String,
    pub username: String,
    /// Only present on the caller's own profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub banner: Option<String>,
    pub note: Option<String>,
    pub status: i64,
    pub online: bool,
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    /// Profile as seen by someone else
    pub fn public(account: Account, online: bool) -> Self {
        Self {
            id: account.id,
            profile_id: account.profile_id,
            username: account.username,
            email: None,
            bio: account.bio,
            avatar: account.avatar,
            banner: account.banner,
            note: account.note,
            status: account.status,
            online,
            created_at: account.created_at,
        }
    }

    /// Profile as seen by its owner
    pub fn own(account: Account, online: bool) -> Self {
        let email = account.email.clone();
        Self {
            email: Some(email),
            ..Self::public(account, online)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            attachment: post.attachment,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FriendsResponse {
    pub friends: Vec<ProfileResponse>,
    /// Accounts waiting for the caller to accept
    pub pending: Vec<ProfileResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub invite: String,
    pub invites_disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Server> for ServerResponse {
    fn from(server: Server) -> Self {
        Self {
            id: server.id,
            owner_id: server.owner_id,
            name: server.name,
            description: server.description,
            icon: server.icon,
            invite: server.invite,
            invites_disabled: server.invites_disabled,
            created_at: server.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InviteResponse {
    pub invite: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelResponse {
    pub id: String,
    pub server_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            server_id: channel.server_id,
            name: channel.name,
            created_at: channel.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub server_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub reply_id: Option<String>,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            server_id: message.server_id,
            channel_id: message.channel_id,
            author_id: message.author_id,
            content: message.content,
            reply_id: message.reply_id,
            edited: message.edited,
            created_at: message.created_at,
        }
    }
}

/// A window of channel history with the profiles of its authors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageHistoryResponse {
    pub messages: Vec<MessageResponse>,
    pub authors: Vec<ProfileResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: String,
    pub server_id: String,
    pub name: String,
    pub color: String,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RoleResponse {
    pub fn new(role: Role, members: Vec<String>) -> Self {
        Self {
            id: role.id,
            server_id: role.server_id,
            name: role.name,
            color: role.hex_color,
            members,
            created_at: role.created_at,
        }
    }
}
