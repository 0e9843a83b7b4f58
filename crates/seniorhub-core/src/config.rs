//! Application configuration management.
//!
//! Configuration comes from `SENIORHUB_*` environment variables. Front-ends
//! call `dotenvy::dotenv()` first so a local `.env` file can supply them.
//!
//! Data (the session store and logs) lives in `~/.local/share/seniorhub`
//! unless `SENIORHUB_DATA_DIR` points elsewhere.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Application name used for data directory paths
const APP_NAME: &str = "seniorhub";

const DEFAULT_API_URL: &str = "http://localhost:4000";
const DEFAULT_API_VERSION: &str = "v1";

/// Port the loopback redirect target listens on when no redirect URI is set.
pub const DEFAULT_LOOPBACK_PORT: u16 = 8765;

/// Path of the loopback redirect target.
pub const DEFAULT_CALLBACK_PATH: &str = "/auth/callback";

/// Sign-in attempts left open longer than this are abandoned.
/// 5 minutes leaves room for account pickers and 2FA prompts.
const DEFAULT_SIGN_IN_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl AppEnv {
    /// Only an explicit `development` enables development behavior.
    /// Unrecognised values are treated as production.
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "development" => AppEnv::Development,
            "test" => AppEnv::Test,
            _ => AppEnv::Production,
        }
    }
}

/// Which key-value backend holds the persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl StorageBackend {
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "keyring" | "keychain" => StorageBackend::Keyring,
            "memory" => StorageBackend::Memory,
            _ => StorageBackend::File,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_version: String,
    pub app_env: AppEnv,
    pub google_client_id: String,
    pub google_redirect_uri: Option<String>,
    pub storage_backend: StorageBackend,
    pub data_dir: Option<PathBuf>,
    pub sign_in_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            app_env: AppEnv::Development,
            google_client_id: String::new(),
            google_redirect_uri: None,
            storage_backend: StorageBackend::File,
            data_dir: None,
            sign_in_timeout: Some(Duration::from_secs(DEFAULT_SIGN_IN_TIMEOUT_SECS)),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let sign_in_timeout = match var("SENIORHUB_SIGN_IN_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.sign_in_timeout,
        };

        Self {
            api_url: var("SENIORHUB_API_URL").unwrap_or(defaults.api_url),
            api_version: var("SENIORHUB_API_VERSION").unwrap_or(defaults.api_version),
            app_env: var("SENIORHUB_APP_ENV")
                .map(|v| AppEnv::parse(&v))
                .unwrap_or_default(),
            google_client_id: var("SENIORHUB_GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_redirect_uri: var("SENIORHUB_GOOGLE_REDIRECT_URI"),
            storage_backend: var("SENIORHUB_STORAGE")
                .map(|v| StorageBackend::parse(&v))
                .unwrap_or_default(),
            data_dir: var("SENIORHUB_DATA_DIR").map(PathBuf::from),
            sign_in_timeout,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }

    pub fn is_google_auth_configured(&self) -> bool {
        !self.google_client_id.trim().is_empty()
    }

    /// Redirect target handed to the identity provider
    pub fn redirect_uri(&self) -> Result<Url> {
        match self.google_redirect_uri {
            Some(ref uri) => {
                Url::parse(uri).with_context(|| format!("Invalid redirect URI: {}", uri))
            }
            None => Url::parse(&format!(
                "http://127.0.0.1:{}{}",
                DEFAULT_LOOPBACK_PORT, DEFAULT_CALLBACK_PATH
            ))
            .context("Invalid default redirect URI"),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.api_url, "http://localhost:4000");
        assert_eq!(config.api_version, "v1");
        assert!(config.is_development());
        assert!(!config.is_google_auth_configured());
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.sign_in_timeout, Some(Duration::from_secs(300)));
        assert_eq!(
            config.redirect_uri().unwrap().as_str(),
            "http://127.0.0.1:8765/auth/callback"
        );
    }

    #[test]
    fn test_reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("SENIORHUB_API_URL", "https://api.seniorhub.test"),
            ("SENIORHUB_API_VERSION", "v2"),
            ("SENIORHUB_APP_ENV", "production"),
            ("SENIORHUB_GOOGLE_CLIENT_ID", "client-123"),
            ("SENIORHUB_GOOGLE_REDIRECT_URI", "http://localhost:9000/cb"),
            ("SENIORHUB_STORAGE", "keyring"),
            ("SENIORHUB_DATA_DIR", "/tmp/seniorhub"),
            ("SENIORHUB_SIGN_IN_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.api_url, "https://api.seniorhub.test");
        assert_eq!(config.api_version, "v2");
        assert!(config.is_production());
        assert!(config.is_google_auth_configured());
        assert_eq!(config.redirect_uri().unwrap().port(), Some(9000));
        assert_eq!(config.storage_backend, StorageBackend::Keyring);
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/seniorhub"));
        assert_eq!(config.sign_in_timeout, None);
    }

    #[test]
    fn test_unknown_app_env_is_not_development() {
        for value in ["staging", "producton", "Production ", "dev"] {
            let config = Config::from_lookup(lookup(&[("SENIORHUB_APP_ENV", value)]));
            assert!(!config.is_development(), "{:?} enabled development", value);
            assert!(config.is_production(), "{:?} was not production", value);
        }

        let config = Config::from_lookup(lookup(&[("SENIORHUB_APP_ENV", "Development")]));
        assert!(config.is_development());
        let config = Config::from_lookup(lookup(&[("SENIORHUB_APP_ENV", "test")]));
        assert_eq!(config.app_env, AppEnv::Test);
    }

    #[test]
    fn test_blank_client_id_is_not_configured() {
        let config = Config::from_lookup(lookup(&[("SENIORHUB_GOOGLE_CLIENT_ID", "   ")]));
        assert!(!config.is_google_auth_configured());
    }

    #[test]
    fn test_invalid_redirect_uri_is_an_error() {
        let config = Config::from_lookup(lookup(&[("SENIORHUB_GOOGLE_REDIRECT_URI", "not a url")]));
        assert!(config.redirect_uri().is_err());
    }
}
