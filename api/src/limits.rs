//! Per-server and per-request caps

/// Roles a server may hold
pub const MAX_ROLES: i64 = 25;

/// Members accepted in one role assignment
pub const MAX_ROLE_MEMBERS: usize = 100;

/// Pinned messages per channel
pub const MAX_PINS: i64 = 50;

/// Channels a server may hold
pub const MAX_CHANNELS: i64 = 50;

/// Messages returned by one history fetch
pub const MAX_MESSAGES_LOADED: i64 = 100;

/// Highest valid presence status
pub const MAX_STATUS: i64 = 3;

/// Default color for new roles
pub const DEFAULT_ROLE_COLOR: &str = "#000000";
