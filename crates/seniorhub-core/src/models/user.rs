use serde::{Deserialize, Serialize};

/// A user signed in through the identity provider.
///
/// `user_id` is the provider's subject id. Field names serialize in camelCase
/// so the persisted layout stays `{userId, email, firstName, lastName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl AuthenticatedUser {
    /// "First Last", skipping empty parts
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let trimmed = full.trim();
        if trimmed.is_empty() {
            self.email.clone()
        } else {
            trimmed.to_string()
        }
    }

    /// Identity headers context for outbound API requests
    pub fn context(&self) -> UserContext {
        UserContext {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// An authenticated user paired with the bearer token that proves it.
///
/// The token is opaque and has no local expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthenticatedUser,
    pub token: String,
}

impl Session {
    pub fn new(user: AuthenticatedUser, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    /// Fixed session used by the development mock sign-in.
    pub fn demo() -> Self {
        Self {
            user: AuthenticatedUser {
                user_id: "demo-user".to_string(),
                email: "demo@seniorhub.com".to_string(),
                first_name: "Demo".to_string(),
                last_name: "User".to_string(),
            },
            token: "demo-token".to_string(),
        }
    }
}

/// Identity attached to API requests as `x-user-*` headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Household setup progress flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HouseholdStatus {
    #[default]
    None,
    Completed,
}

impl HouseholdStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HouseholdStatus::None => "Not set up",
            HouseholdStatus::Completed => "Set up",
        }
    }
}
