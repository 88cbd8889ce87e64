use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
pub mod limits;
pub mod middleware_hooks;
pub mod models;
pub mod password;
pub mod presence;
pub mod reporter;
pub mod schemas;
pub mod server;


// Re-export server functions for convenience
pub use server::{start_server_with_config, ApiConfig};

use handlers::{auth, channels, friends, health, messages, profiles, roles, servers};
use presence::{InMemoryPresence, PresenceStore};
use reporter::PerformanceReporter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<database::Database>,
    pub presence: Arc<dyn PresenceStore>,
    pub reporter: PerformanceReporter,
}

impl AppState {
    /// State with a process-local presence registry
    pub fn new(db: Arc<database::Database>, reporter: PerformanceReporter) -> Self {
        Self {
            db,
            presence: Arc::new(InMemoryPresence::new()),
            reporter,
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::regenerate_token,
        profiles::get_me,
        profiles::update_status,
        profiles::update_note,
        profiles::update_profile,
        profiles::get_profile,
        profiles::create_post,
        profiles::list_posts,
        profiles::delete_post,
        friends::add_friend,
        friends::accept_friend,
        friends::reject_friend,
        friends::remove_friend,
        friends::list_friends,
        servers::create_server,
        servers::list_servers,
        servers::join_server,
        servers::edit_server,
        servers::leave_server,
        servers::delete_server,
        servers::regenerate_invite,
        servers::toggle_invites,
        servers::transfer_server,
        servers::kick_member,
        servers::list_members,
        channels::create_channel,
        channels::list_channels,
        channels::rename_channel,
        channels::delete_channel,
        messages::send_message,
        messages::fetch_messages,
        messages::edit_message,
        messages::delete_message,
        messages::pin_message,
        messages::unpin_message,
        messages::list_pins,
        roles::create_role,
        roles::edit_role,
        roles::assign_role,
        roles::delete_role,
        roles::list_roles,
        health::health_check,
    ),
    components(
        schemas(
            models::RegisterRequest,
            models::LoginRequest,
            models::StatusRequest,
            models::NoteRequest,
            models::ProfileRequest,
            models::PostRequest,
            models::TargetProfileRequest,
            models::CreateServerRequest,
            models::EditServerRequest,
            models::JoinServerRequest,
            models::ToggleInvitesRequest,
            models::ChannelRequest,
            models::SendMessageRequest,
            models::EditMessageRequest,
            models::RoleRequest,
            models::AssignRoleRequest,
            models::HealthResponse,
            models::DatabaseHealth,
            models::SuccessResponse,
            models::SessionResponse,
            models::TokenResponse,
            models::ProfileResponse,
            models::PostResponse,
            models::FriendsResponse,
            models::ServerResponse,
            models::InviteResponse,
            models::ChannelResponse,
            models::MessageResponse,
            models::MessageHistoryResponse,
            models::RoleResponse,
            error::ApiErrorResponse,
            error::ErrorDetail,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "accounts", description = "Registration and sessions"),
        (name = "profiles", description = "Profiles and posts"),
        (name = "friends", description = "Friend requests"),
        (name = "servers", description = "Servers and membership"),
        (name = "channels", description = "Server channels"),
        (name = "messages", description = "Channel messages and pins"),
        (name = "roles", description = "Server roles"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Parley API",
        version = "0.1.0",
        description = "RESTful API for the Parley chat backend",
    ),
)]
pub struct ApiDoc;

/// Create the main API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Routes open to any member of the server in the path
    let member_routes = Router::new()
        .route("/servers/:server_id/leave", post(servers::leave_server))
        .route("/servers/:server_id/members", get(servers::list_members))
        .route("/servers/:server_id/channels", get(channels::list_channels))
        .route(
            "/servers/:server_id/channels/:channel_id/messages",
            post(messages::send_message).get(messages::fetch_messages),
        )
        .route(
            "/servers/:server_id/channels/:channel_id/messages/:message_id",
            delete(messages::delete_message),
        )
        .route(
            "/servers/:server_id/channels/:channel_id/messages/:message_id/edit",
            post(messages::edit_message),
        )
        .route(
            "/servers/:server_id/channels/:channel_id/pins",
            get(messages::list_pins),
        )
        .route("/servers/:server_id/roles", get(roles::list_roles))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::resolve_scope,
        ));

    // Owner routes; the scope is resolved before the owner check
    let owner_routes = Router::new()
        .route("/servers/:server_id", delete(servers::delete_server))
        .route("/servers/:server_id/edit", post(servers::edit_server))
        .route(
            "/servers/:server_id/invite/regenerate",
            post(servers::regenerate_invite),
        )
        .route(
            "/servers/:server_id/invite/toggle",
            post(servers::toggle_invites),
        )
        .route("/servers/:server_id/transfer", post(servers::transfer_server))
        .route("/servers/:server_id/kick", post(servers::kick_member))
        .route(
            "/servers/:server_id/channels/create",
            post(channels::create_channel),
        )
        .route(
            "/servers/:server_id/channels/:channel_id",
            delete(channels::delete_channel),
        )
        .route(
            "/servers/:server_id/channels/:channel_id/rename",
            post(channels::rename_channel),
        )
        .route(
            "/servers/:server_id/channels/:channel_id/messages/:message_id/pin",
            post(messages::pin_message),
        )
        .route(
            "/servers/:server_id/channels/:channel_id/messages/:message_id/unpin",
            post(messages::unpin_message),
        )
        .route("/servers/:server_id/roles/create", post(roles::create_role))
        .route(
            "/servers/:server_id/roles/:role_id",
            delete(roles::delete_role),
        )
        .route("/servers/:server_id/roles/:role_id/edit", post(roles::edit_role))
        .route(
            "/servers/:server_id/roles/:role_id/assign",
            post(roles::assign_role),
        )
        .route_layer(middleware::from_fn(middleware_hooks::require_owner))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::resolve_scope,
        ));

    // Everything that needs a session
    let account_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/token/regenerate", post(auth::regenerate_token))
        .route("/me", get(profiles::get_me))
        .route("/me/status", post(profiles::update_status))
        .route("/me/note", post(profiles::update_note))
        .route("/me/profile", post(profiles::update_profile))
        .route("/me/posts", post(profiles::create_post))
        .route("/me/posts/:post_id", delete(profiles::delete_post))
        .route("/profiles/:profile_id", get(profiles::get_profile))
        .route("/profiles/:profile_id/posts", get(profiles::list_posts))
        .route("/friends", get(friends::list_friends))
        .route("/friends/add", post(friends::add_friend))
        .route("/friends/accept", post(friends::accept_friend))
        .route("/friends/reject", post(friends::reject_friend))
        .route("/friends/remove", post(friends::remove_friend))
        .route("/servers", get(servers::list_servers))
        .route("/servers/create", post(servers::create_server))
        .route("/servers/join", post(servers::join_server))
        .merge(member_routes)
        .merge(owner_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::require_account,
        ));

    // API v1 routes
    let api_v1 = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(health::health_check))
        .merge(account_routes);

    // Main router
    Router::new()
        .nest("/api/v1", api_v1)
        .merge(SwaggerUi::new("/api/v1/swagger").url("/api/v1/openapi.json", ApiDoc::openapi()))
        // Swagger UI goes through the hooks too
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::request_middleware,
        ))
        .layer(middleware::from_fn(middleware_hooks::response_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
