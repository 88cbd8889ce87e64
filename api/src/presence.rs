use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::debug;

/// Registry of accounts with a live session
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Mark an account as online
    async fn login(&self, account_id: &str);

    /// Mark an account as offline
    async fn logout(&self, account_id: &str);

    async fn is_online(&self, account_id: &str) -> bool;
}

/// Process-local presence registry
#[derive(Debug, Default)]
pub struct InMemoryPresence {
    online: RwLock<HashSet<String>>,
}

impl InMemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceStore for InMemoryPresence {
    async fn login(&self, account_id: &str) {
        debug!("Account {} is online", account_id);
        self.online.write().await.insert(account_id.to_string());
    }

    async fn logout(&self, account_id: &str) {
        debug!("Account {} is offline", account_id);
        self.online.write().await.remove(account_id);
    }

    async fn is_online(&self, account_id: &str) -> bool {
        self.online.read().await.contains(account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_logout() {
        let presence = InMemoryPresence::new();
        assert!(!presence.is_online("a").await);

        presence.login("a").await;
        presence.login("a").await;
        assert!(presence.is_online("a").await);

        presence.logout("a").await;
        assert!(!presence.is_online("a").await);

        // Logging out twice is harmless
        presence.logout("a").await;
    }
}
