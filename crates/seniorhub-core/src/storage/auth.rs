use tracing::{debug, info, warn};

use crate::models::{AuthenticatedUser, Session};

use super::{StorageKey, StorageService};

/// Persists the signed-in user and bearer token as two independent entries.
#[derive(Clone)]
pub struct AuthStorage {
    storage: StorageService,
}

impl AuthStorage {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Persist both parts. Returns false if either write failed.
    pub fn save_auth_data(&self, user: &AuthenticatedUser, token: &str) -> bool {
        let saved_user = self.storage.save(StorageKey::AuthUser, user);
        let saved_token = self.storage.save(StorageKey::AuthToken, token);
        if saved_user && saved_token {
            info!(user_id = %user.user_id, "Authentication data saved");
            true
        } else {
            warn!(
                user_id = %user.user_id,
                saved_user,
                saved_token,
                "Authentication data not fully saved"
            );
            false
        }
    }

    /// Restore a session. Partial data (only user or only token) is no session.
    pub fn load_auth_data(&self) -> Option<Session> {
        let user = self.storage.load::<AuthenticatedUser>(StorageKey::AuthUser);
        let token = self
            .storage
            .load::<String>(StorageKey::AuthToken)
            .filter(|t| !t.is_empty());

        match (user, token) {
            (Some(user), Some(token)) => {
                debug!(user_id = %user.user_id, "Authentication data loaded");
                Some(Session { user, token })
            }
            (user, token) => {
                debug!(
                    has_user = user.is_some(),
                    has_token = token.is_some(),
                    "No auth data found"
                );
                None
            }
        }
    }

    pub fn clear_auth_data(&self) {
        self.storage.remove(StorageKey::AuthUser);
        self.storage.remove(StorageKey::AuthToken);
        info!("Authentication data cleared");
    }
}
