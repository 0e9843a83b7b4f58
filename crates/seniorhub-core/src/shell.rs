//! Session lifecycle glue for front-ends.
//!
//! `SessionShell` owns the live session and ties the pieces together:
//! restore on mount, persist after a successful sign-in, clear on logout.
//! Rendering is left to the front-end, which follows `view()`.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, RequestContext};
use crate::auth::{
    AuthError, AuthSessionManager, AuthTransport, GoogleProfileClient, LoopbackTransport,
    OAuthConfig, ProfileSource, SignInAttempt, SignInCancel,
};
use crate::config::Config;
use crate::models::{HouseholdStatus, Session};
use crate::storage::{AuthStorage, HouseholdStorage, StorageService};

/// Which top-level screen the front-end should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellView {
    Loading,
    SignIn,
    Dashboard,
}

pub struct SessionShell {
    storage: StorageService,
    auth_storage: AuthStorage,
    household: HouseholdStorage,
    auth: AuthSessionManager,
    api: ApiClient,
    session: Option<Session>,
    view: ShellView,
    allow_demo: bool,
}

impl SessionShell {
    /// Wire up storage, the loopback transport and the Google profile client from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = StorageService::from_config(config)?;
        let oauth = OAuthConfig::from_config(config)?;
        let transport = Arc::new(LoopbackTransport::new(oauth.redirect_uri.clone()));
        let profiles = Arc::new(GoogleProfileClient::new(oauth.userinfo_endpoint.clone())?);
        let auth = AuthSessionManager::new(oauth, transport, profiles);
        let api = ApiClient::new(config)?;
        Ok(Self::new(storage, auth, api).allow_demo(config.is_development()))
    }

    pub fn new(storage: StorageService, auth: AuthSessionManager, api: ApiClient) -> Self {
        Self {
            auth_storage: AuthStorage::new(storage.clone()),
            household: HouseholdStorage::new(storage.clone()),
            storage,
            auth,
            api,
            session: None,
            view: ShellView::Loading,
            allow_demo: false,
        }
    }

    /// Enable the mock sign-in used during development
    pub fn allow_demo(mut self, allow: bool) -> Self {
        self.allow_demo = allow;
        self
    }

    /// Convenience constructor for hosts that bring their own transport and profile source
    pub fn with_parts(
        storage: StorageService,
        oauth: OAuthConfig,
        transport: Arc<dyn AuthTransport>,
        profiles: Arc<dyn ProfileSource>,
        api: ApiClient,
    ) -> Self {
        Self::new(storage, AuthSessionManager::new(oauth, transport, profiles), api)
    }

    pub fn view(&self) -> ShellView {
        self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn auth(&self) -> &AuthSessionManager {
        &self.auth
    }

    pub fn demo_allowed(&self) -> bool {
        self.allow_demo
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Identity for API calls; anonymous when signed out
    pub fn request_context(&self) -> RequestContext {
        self.session
            .as_ref()
            .map(RequestContext::from_session)
            .unwrap_or_default()
    }

    /// Restore a persisted session and pick the first screen
    pub fn mount(&mut self) -> ShellView {
        self.view = ShellView::Loading;
        match self.auth_storage.load_auth_data() {
            Some(session) => {
                info!(user_id = %session.user.user_id, "Restored persisted session");
                self.session = Some(session);
                self.view = ShellView::Dashboard;
            }
            None => {
                debug!("No persisted session, showing sign-in");
                self.session = None;
                self.view = ShellView::SignIn;
            }
        }
        self.view
    }

    pub fn begin_sign_in(&mut self) -> Result<SignInAttempt, AuthError> {
        self.auth.begin_sign_in()
    }

    /// Apply an attempt's result. A new session is persisted before the shell
    /// switches to the dashboard.
    pub fn complete_sign_in(
        &mut self,
        result: Result<Session, AuthError>,
    ) -> Result<&Session, AuthError> {
        let session = self.auth.finish_sign_in(result)?;
        Ok(self.adopt(session))
    }

    pub async fn sign_in(&mut self, cancel: &SignInCancel) -> Result<&Session, AuthError> {
        let attempt = self.begin_sign_in()?;
        let result = attempt.run(cancel).await;
        self.complete_sign_in(result)
    }

    /// Development mock sign-in with the fixed demo user
    pub fn sign_in_demo(&mut self) -> Option<&Session> {
        if !self.allow_demo {
            warn!("Demo sign-in requested outside development");
            return None;
        }
        Some(self.adopt(Session::demo()))
    }

    fn adopt(&mut self, session: Session) -> &Session {
        self.auth_storage.save_auth_data(&session.user, &session.token);
        self.view = ShellView::Dashboard;
        self.session.insert(session)
    }

    /// Clear every persisted key, reset the sign-in state and return to sign-in
    pub fn logout(&mut self) {
        self.storage.clear();
        self.auth.sign_out();
        self.session = None;
        self.view = ShellView::SignIn;
        info!("Signed out");
    }

    pub fn household_status(&self) -> HouseholdStatus {
        self.household.load_household_status()
    }

    pub fn mark_household_completed(&self) {
        self.household.mark_household_completed();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::{AuthState, ChannelTransport, PopupController};
    use crate::models::AuthenticatedUser;
    use crate::storage::{KeyValueStore, MemoryStore, StorageKey};
    use crate::test_support::{wait_until_listening, FailingStore, FixedProfile};

    const ORIGIN: &str = "http://127.0.0.1:8765";

    fn shell_with(
        store: Arc<dyn KeyValueStore>,
        client_id: &str,
    ) -> (SessionShell, PopupController) {
        let config = Config {
            google_client_id: client_id.to_string(),
            sign_in_timeout: None,
            ..Config::default()
        };
        let (transport, controller) = ChannelTransport::new();
        let shell = SessionShell::with_parts(
            StorageService::new(store),
            OAuthConfig::from_config(&config).unwrap(),
            Arc::new(transport),
            Arc::new(FixedProfile::default()),
            ApiClient::new(&config).unwrap(),
        );
        (shell, controller)
    }

    fn expected_session() -> Session {
        Session {
            user: AuthenticatedUser {
                user_id: "u1".to_string(),
                email: "a@b.com".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
            },
            token: "tok123".to_string(),
        }
    }

    #[test]
    fn test_mount_without_session_shows_sign_in() {
        let (mut shell, _) = shell_with(Arc::new(MemoryStore::new()), "client");
        assert_eq!(shell.view(), ShellView::Loading);
        assert_eq!(shell.mount(), ShellView::SignIn);
        assert!(!shell.is_authenticated());
        assert_eq!(shell.request_context(), RequestContext::anonymous());
    }

    #[test]
    fn test_mount_restores_complete_session() {
        let store = Arc::new(MemoryStore::new());
        AuthStorage::new(StorageService::new(store.clone()))
            .save_auth_data(&expected_session().user, "tok123");

        let (mut shell, _) = shell_with(store, "client");
        assert_eq!(shell.mount(), ShellView::Dashboard);
        assert_eq!(shell.session(), Some(&expected_session()));
        assert_eq!(shell.request_context().token.as_deref(), Some("tok123"));
    }

    #[test]
    fn test_mount_with_partial_session_shows_sign_in() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(StorageKey::AuthUser.as_str(), &serde_json::to_string(&expected_session().user).unwrap())
            .unwrap();

        let (mut shell, _) = shell_with(store, "client");
        assert_eq!(shell.mount(), ShellView::SignIn);
        assert!(shell.session().is_none());
    }

    #[test]
    fn test_mount_degrades_when_storage_fails() {
        let (mut shell, _) = shell_with(Arc::new(FailingStore::default()), "client");
        assert_eq!(shell.mount(), ShellView::SignIn);
    }

    #[tokio::test]
    async fn test_sign_in_persists_exact_session() {
        let store = Arc::new(MemoryStore::new());
        let (mut shell, controller) = shell_with(store.clone(), "client");
        shell.mount();

        let attempt = shell.begin_sign_in().unwrap();
        let task = tokio::spawn(async move { attempt.run(&SignInCancel::new()).await });
        wait_until_listening(&controller).await;
        controller.post_message(ORIGIN, json!({"type": "auth-success", "access_token": "tok123"}));

        let session = shell.complete_sign_in(task.await.unwrap()).unwrap().clone();
        assert_eq!(session, expected_session());
        assert_eq!(shell.view(), ShellView::Dashboard);

        let persisted_user: serde_json::Value =
            serde_json::from_str(&store.get("seniorhub_auth_user").unwrap().unwrap()).unwrap();
        assert_eq!(
            persisted_user,
            json!({"userId": "u1", "email": "a@b.com", "firstName": "A", "lastName": "B"})
        );
        assert_eq!(store.get("seniorhub_auth_token").unwrap().as_deref(), Some("\"tok123\""));

        // A fresh shell over the same store restores it
        let (mut restored, _) = shell_with(store, "client");
        assert_eq!(restored.mount(), ShellView::Dashboard);
        assert_eq!(restored.session(), Some(&expected_session()));
    }

    #[tokio::test]
    async fn test_cancelled_sign_in_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (mut shell, controller) = shell_with(store.clone(), "client");
        shell.mount();

        let attempt = shell.begin_sign_in().unwrap();
        let task = tokio::spawn(async move { attempt.run(&SignInCancel::new()).await });
        wait_until_listening(&controller).await;
        controller.close();

        let err = shell.complete_sign_in(task.await.unwrap()).unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
        assert_eq!(shell.view(), ShellView::SignIn);
        assert_eq!(shell.auth().state(), AuthState::Cancelled);
        assert_eq!(store.get("seniorhub_auth_user").unwrap(), None);
        assert_eq!(store.get("seniorhub_auth_token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_unconfigured_sign_in_reports_error() {
        let (mut shell, controller) = shell_with(Arc::new(MemoryStore::new()), "");
        shell.mount();

        let err = shell.sign_in(&SignInCancel::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
        assert_eq!(shell.auth().error_message(), Some("Google OAuth is not configured"));
        assert!(controller.opened().is_empty());
        assert_eq!(shell.view(), ShellView::SignIn);
    }

    #[test]
    fn test_logout_clears_all_keys() {
        let store = Arc::new(MemoryStore::new());
        let (mut shell, _) = shell_with(store.clone(), "client");
        shell.allow_demo = true;
        shell.sign_in_demo().unwrap();
        shell.mark_household_completed();
        assert_eq!(shell.household_status(), HouseholdStatus::Completed);

        shell.logout();

        for key in StorageKey::ALL {
            assert_eq!(store.get(key.as_str()).unwrap(), None);
        }
        assert_eq!(shell.view(), ShellView::SignIn);
        assert!(shell.session().is_none());
        assert_eq!(shell.auth().state(), AuthState::Idle);
    }

    #[test]
    fn test_logout_survives_failing_removal() {
        let (mut shell, _) = shell_with(Arc::new(FailingStore::removals_only()), "client");
        shell.allow_demo = true;
        shell.sign_in_demo().unwrap();
        assert_eq!(shell.view(), ShellView::Dashboard);

        shell.logout();

        assert_eq!(shell.view(), ShellView::SignIn);
        assert!(!shell.is_authenticated());
    }

    #[test]
    fn test_demo_sign_in_requires_development() {
        let (mut shell, _) = shell_with(Arc::new(MemoryStore::new()), "client");
        assert!(shell.sign_in_demo().is_none());
        assert_eq!(shell.view(), ShellView::Loading);

        let mut shell = shell.allow_demo(true);
        assert_eq!(shell.sign_in_demo().map(|s| s.user.user_id.clone()).as_deref(), Some("demo-user"));
        assert_eq!(shell.view(), ShellView::Dashboard);
    }
}
