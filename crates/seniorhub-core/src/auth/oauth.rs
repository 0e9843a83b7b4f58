use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::config::Config;

/// Google authorization endpoint (implicit flow)
pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google userinfo endpoint, returns `id`, `email`, `given_name`, `family_name`
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub const SCOPES: [&str; 3] = ["openid", "profile", "email"];

pub const POPUP_WIDTH: u32 = 500;
pub const POPUP_HEIGHT: u32 = 600;
pub const POPUP_WINDOW_NAME: &str = "seniorhub-auth";

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: Url,
    pub authorization_endpoint: Url,
    pub userinfo_endpoint: Url,
    /// `None` waits for the popup indefinitely
    pub timeout: Option<Duration>,
}

impl OAuthConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            client_id: config.google_client_id.trim().to_string(),
            redirect_uri: config.redirect_uri()?,
            authorization_endpoint: Url::parse(AUTHORIZATION_ENDPOINT)
                .context("Invalid authorization endpoint")?,
            userinfo_endpoint: Url::parse(USERINFO_ENDPOINT)
                .context("Invalid userinfo endpoint")?,
            timeout: config.sign_in_timeout,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
    }

    /// Origin that relayed messages must come from: the redirect target's own origin
    pub fn expected_origin(&self) -> String {
        self.redirect_uri.origin().ascii_serialization()
    }

    pub fn authorization_url(&self) -> Url {
        let mut url = self.authorization_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "token")
            .append_pair("scope", &SCOPES.join(" "));
        url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// Size and position of the sign-in popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    pub width: u32,
    pub height: u32,
    pub left: i64,
    pub top: i64,
}

impl PopupGeometry {
    /// 500×600 centered on `screen`, or at the origin when the screen is unknown.
    pub fn centered(screen: Option<ScreenSize>) -> Self {
        let (left, top) = match screen {
            Some(s) => (
                i64::from(s.width) / 2 - i64::from(POPUP_WIDTH) / 2,
                i64::from(s.height) / 2 - i64::from(POPUP_HEIGHT) / 2,
            ),
            None => (0, 0),
        };
        Self {
            width: POPUP_WIDTH,
            height: POPUP_HEIGHT,
            left,
            top,
        }
    }

    /// `window.open` feature string
    pub fn features(&self) -> String {
        format!(
            "width={},height={},left={},top={}",
            self.width, self.height, self.left, self.top
        )
    }
}
