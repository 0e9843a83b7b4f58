use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::models::{AuthenticatedUser, Session};

use super::oauth::{OAuthConfig, PopupGeometry, POPUP_WINDOW_NAME};
use super::profile::ProfileSource;
use super::transport::{AuthMessage, AuthTransport, PopupEvent, PopupRequest, SignInCancel};
use super::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Authenticating,
    Authenticated,
    Failed,
    Cancelled,
}

/// Drives sign-in attempts and holds the resulting user and bearer token.
///
/// The manager never touches persisted storage; callers persist the session
/// returned by a successful attempt.
pub struct AuthSessionManager {
    config: OAuthConfig,
    transport: Arc<dyn AuthTransport>,
    profiles: Arc<dyn ProfileSource>,
    state: AuthState,
    user: Option<AuthenticatedUser>,
    access_token: Option<String>,
    error_message: Option<String>,
}

impl AuthSessionManager {
    pub fn new(
        config: OAuthConfig,
        transport: Arc<dyn AuthTransport>,
        profiles: Arc<dyn ProfileSource>,
    ) -> Self {
        Self {
            config,
            transport,
            profiles,
            state: AuthState::Idle,
            user: None,
            access_token: None,
            error_message: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticating(&self) -> bool {
        self.state == AuthState::Authenticating
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// User-facing text of the last failure
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Start an attempt. The returned attempt must be run and its result
    /// handed back through `finish_sign_in`.
    pub fn begin_sign_in(&mut self) -> Result<SignInAttempt, AuthError> {
        if self.is_authenticating() {
            return Err(AuthError::InProgress);
        }
        // A new attempt replaces whatever session was held before
        self.user = None;
        self.access_token = None;
        if !self.config.is_configured() {
            error!("Missing Google client id in configuration");
            let err = AuthError::NotConfigured;
            self.state = AuthState::Failed;
            self.error_message = Some(err.to_string());
            return Err(err);
        }

        self.state = AuthState::Authenticating;
        self.error_message = None;
        debug!("Sign-in attempt started");

        Ok(SignInAttempt {
            config: self.config.clone(),
            transport: self.transport.clone(),
            profiles: self.profiles.clone(),
        })
    }

    /// Apply the outcome of an attempt started with `begin_sign_in`
    pub fn finish_sign_in(
        &mut self,
        result: Result<Session, AuthError>,
    ) -> Result<Session, AuthError> {
        match result {
            Ok(session) => {
                info!(user_id = %session.user.user_id, "Sign-in succeeded");
                self.user = Some(session.user.clone());
                self.access_token = Some(session.token.clone());
                self.error_message = None;
                self.state = AuthState::Authenticated;
                Ok(session)
            }
            Err(err) => {
                if matches!(err, AuthError::Cancelled) {
                    info!("Sign-in cancelled");
                    self.state = AuthState::Cancelled;
                } else {
                    error!(error = %err, "Authentication error");
                    self.state = AuthState::Failed;
                }
                self.error_message = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn sign_in(&mut self, cancel: &SignInCancel) -> Result<Session, AuthError> {
        let attempt = self.begin_sign_in()?;
        let result = attempt.run(cancel).await;
        self.finish_sign_in(result)
    }

    /// Drop the in-memory user, token and error. Persisted data is untouched.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.access_token = None;
        self.error_message = None;
        self.state = AuthState::Idle;
    }
}

/// One sign-in round trip, detached from the manager so it can run on a task.
pub struct SignInAttempt {
    config: OAuthConfig,
    transport: Arc<dyn AuthTransport>,
    profiles: Arc<dyn ProfileSource>,
}

impl SignInAttempt {
    pub async fn run(self, cancel: &SignInCancel) -> Result<Session, AuthError> {
        let access_token = self.wait_for_token(cancel).await?;
        let profile = self.profiles.fetch_profile(&access_token).await?;
        Ok(Session::new(AuthenticatedUser::from(profile), access_token))
    }

    /// Open the popup and wait for the first trusted result.
    /// The popup session is dropped on return, so later messages go nowhere.
    async fn wait_for_token(&self, cancel: &SignInCancel) -> Result<String, AuthError> {
        let request = PopupRequest {
            url: self.config.authorization_url(),
            window_name: POPUP_WINDOW_NAME,
            geometry: PopupGeometry::centered(self.transport.screen_size()),
        };
        let mut popup = self.transport.open_auth_popup(&request).await?;
        let expected_origin = self.config.expected_origin();

        let timeout = self.config.timeout;
        let deadline = async move {
            match timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = &mut deadline => {
                    warn!(timeout = ?timeout, "Sign-in popup left open too long");
                    return Err(AuthError::TimedOut);
                }
                event = popup.next_event() => match event {
                    None | Some(PopupEvent::Closed) => return Err(AuthError::Cancelled),
                    Some(PopupEvent::Message(message)) => {
                        if message.origin != expected_origin {
                            debug!(origin = %message.origin, "Ignoring message from untrusted origin");
                            continue;
                        }
                        match AuthMessage::parse(&message.data) {
                            Some(AuthMessage::Success { access_token }) => return Ok(access_token),
                            Some(AuthMessage::Error { error }) => {
                                return Err(AuthError::Provider(
                                    error.unwrap_or_else(|| "Authentication failed".to_string()),
                                ));
                            }
                            None => debug!("Ignoring unrelated message"),
                        }
                    }
                },
            }
        }
    }
}
