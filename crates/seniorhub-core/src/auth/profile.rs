use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::models::AuthenticatedUser;

use super::AuthError;

/// HTTP request timeout in seconds for the userinfo lookup.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Userinfo response from the identity provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

impl From<ProviderProfile> for AuthenticatedUser {
    fn from(profile: ProviderProfile) -> Self {
        AuthenticatedUser {
            user_id: profile.id,
            email: profile.email,
            first_name: profile.given_name.unwrap_or_default(),
            last_name: profile.family_name.unwrap_or_default(),
        }
    }
}

/// Looks up the profile behind a bearer token.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AuthError>;
}

/// Userinfo client for Google.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct GoogleProfileClient {
    client: Client,
    userinfo_endpoint: Url,
}

impl GoogleProfileClient {
    pub fn new(userinfo_endpoint: Url) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            userinfo_endpoint,
        })
    }
}

#[async_trait]
impl ProfileSource for GoogleProfileClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AuthError> {
        let response = self
            .client
            .get(self.userinfo_endpoint.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Userinfo request rejected");
            return Err(AuthError::ProfileFetch {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let profile: ProviderProfile =
            serde_json::from_str(&body).map_err(|e| AuthError::InvalidProfile(e.to_string()))?;
        debug!(user_id = %profile.id, "Fetched user profile");
        Ok(profile)
    }
}
