use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use url::Url;

use super::oauth::{PopupGeometry, ScreenSize};
use super::AuthError;

/// Buffer size for popup events.
/// A sign-in produces one message and at most one close signal.
const EVENT_BUFFER_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct PopupRequest {
    pub url: Url,
    pub window_name: &'static str,
    pub geometry: PopupGeometry,
}

/// A message posted to the opener, tagged with the sender's origin.
#[derive(Debug, Clone)]
pub struct CrossWindowMessage {
    pub origin: String,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub enum PopupEvent {
    Message(CrossWindowMessage),
    /// The popup window went away
    Closed,
}

/// Result payload relayed by the redirect target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum AuthMessage {
    #[serde(rename = "auth-success", alias = "google-auth-success")]
    Success { access_token: String },

    #[serde(rename = "auth-error", alias = "google-auth-error")]
    Error {
        #[serde(default)]
        error: Option<String>,
    },
}

impl AuthMessage {
    /// `None` for payloads that are not sign-in results
    pub fn parse(data: &Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// An open popup: its event stream plus whatever must be torn down with it.
///
/// Dropping the session removes the listener and runs the teardown hook.
pub struct PopupSession {
    events: mpsc::Receiver<PopupEvent>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl PopupSession {
    pub fn new(events: mpsc::Receiver<PopupEvent>) -> Self {
        Self {
            events,
            teardown: None,
        }
    }

    pub fn with_teardown(mut self, teardown: impl FnOnce() + Send + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// Next event, `None` once the transport has gone away
    pub async fn next_event(&mut self) -> Option<PopupEvent> {
        self.events.recv().await
    }
}

impl Drop for PopupSession {
    fn drop(&mut self) {
        self.events.close();
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

/// Opens the identity provider in a secondary window and relays its result.
#[async_trait]
pub trait AuthTransport: Send + Sync {
    /// Screen the popup is centered on, if the platform knows it
    fn screen_size(&self) -> Option<ScreenSize> {
        None
    }

    async fn open_auth_popup(&self, request: &PopupRequest) -> Result<PopupSession, AuthError>;
}

/// Caller-side cancellation for a running sign-in attempt.
///
/// Clones share state; cancelling any clone cancels them all.
#[derive(Clone)]
pub struct SignInCancel {
    tx: Arc<watch::Sender<bool>>,
}

impl SignInCancel {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so this only ends on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for SignInCancel {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct ChannelState {
    block_popups: bool,
    opened: Vec<PopupRequest>,
    sender: Option<mpsc::Sender<PopupEvent>>,
}

/// In-process transport for hosts that own their own window system.
///
/// The host drives the popup through the paired `PopupController`.
pub struct ChannelTransport {
    state: Arc<Mutex<ChannelState>>,
    screen: Option<ScreenSize>,
}

impl ChannelTransport {
    pub fn new() -> (Self, PopupController) {
        let state = Arc::new(Mutex::new(ChannelState::default()));
        let transport = Self {
            state: state.clone(),
            screen: None,
        };
        (transport, PopupController { state })
    }

    pub fn with_screen(mut self, screen: ScreenSize) -> Self {
        self.screen = Some(screen);
        self
    }
}

#[async_trait]
impl AuthTransport for ChannelTransport {
    fn screen_size(&self) -> Option<ScreenSize> {
        self.screen
    }

    async fn open_auth_popup(&self, request: &PopupRequest) -> Result<PopupSession, AuthError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AuthError::Transport("popup state lock poisoned".to_string()))?;
        if state.block_popups {
            return Err(AuthError::PopupBlocked {
                reason: "popups are blocked by the host".to_string(),
            });
        }
        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        state.opened.push(request.clone());
        state.sender = Some(tx);
        Ok(PopupSession::new(rx))
    }
}

/// Host-side handle for a `ChannelTransport`.
#[derive(Clone)]
pub struct PopupController {
    state: Arc<Mutex<ChannelState>>,
}

impl PopupController {
    fn with_state<R>(&self, f: impl FnOnce(&mut ChannelState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn block_popups(&self, block: bool) {
        self.with_state(|s| s.block_popups = block);
    }

    /// Every popup request seen so far, oldest first
    pub fn opened(&self) -> Vec<PopupRequest> {
        self.with_state(|s| s.opened.clone())
    }

    /// Whether the current popup still has a live listener
    pub fn is_listening(&self) -> bool {
        self.with_state(|s| s.sender.as_ref().is_some_and(|tx| !tx.is_closed()))
    }

    /// Deliver a message to the listener. Returns false if nobody is listening.
    pub fn post_message(&self, origin: &str, data: Value) -> bool {
        let event = PopupEvent::Message(CrossWindowMessage {
            origin: origin.to_string(),
            data,
        });
        self.with_state(|s| match s.sender {
            Some(ref tx) => tx.try_send(event).is_ok(),
            None => false,
        })
    }

    /// Close the popup window
    pub fn close(&self) {
        self.with_state(|s| {
            if let Some(tx) = s.sender.take() {
                let _ = tx.try_send(PopupEvent::Closed);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_success_message() {
        let msg = AuthMessage::parse(&json!({"type": "auth-success", "access_token": "tok123"}));
        assert_eq!(
            msg,
            Some(AuthMessage::Success {
                access_token: "tok123".to_string()
            })
        );
    }

    #[test]
    fn test_parse_legacy_message_types() {
        let msg = AuthMessage::parse(&json!({"type": "google-auth-success", "access_token": "t"}));
        assert!(matches!(msg, Some(AuthMessage::Success { .. })));

        let msg = AuthMessage::parse(&json!({"type": "google-auth-error", "error": "denied"}));
        assert_eq!(
            msg,
            Some(AuthMessage::Error {
                error: Some("denied".to_string())
            })
        );
    }

    #[test]
    fn test_parse_error_without_text() {
        let msg = AuthMessage::parse(&json!({"type": "auth-error"}));
        assert_eq!(msg, Some(AuthMessage::Error { error: None }));
    }

    #[test]
    fn test_parse_ignores_unrelated_payloads() {
        assert_eq!(AuthMessage::parse(&json!({"type": "webpack-ok"})), None);
        assert_eq!(AuthMessage::parse(&json!({"type": "auth-success"})), None);
        assert_eq!(AuthMessage::parse(&json!("auth-success")), None);
    }

    #[tokio::test]
    async fn test_cancel_resolves_waiters() {
        let cancel = SignInCancel::new();
        assert!(!cancel.is_cancelled());

        let waiter = {
            let cancel = cancel.clone();
            tokio::spawn(async move { cancel.cancelled().await })
        };
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert!(cancel.is_cancelled());

        // Already-cancelled tokens resolve immediately
        cancel.cancelled().await;
    }

    #[tokio::test]
    async fn test_dropping_session_stops_listening() {
        let (transport, controller) = ChannelTransport::new();
        let request = PopupRequest {
            url: Url::parse("https://example.com/auth").unwrap(),
            window_name: "test",
            geometry: PopupGeometry::centered(None),
        };

        let session = transport.open_auth_popup(&request).await.unwrap();
        assert!(controller.is_listening());
        assert!(controller.post_message("http://localhost", json!({})));

        drop(session);
        assert!(!controller.is_listening());
        assert!(!controller.post_message("http://localhost", json!({})));
    }

    #[tokio::test]
    async fn test_teardown_runs_on_drop() {
        let (_tx, rx) = mpsc::channel(1);
        let flag = Arc::new(Mutex::new(false));
        let session = PopupSession::new(rx).with_teardown({
            let flag = flag.clone();
            move || *flag.lock().unwrap() = true
        });
        drop(session);
        assert!(*flag.lock().unwrap());
    }
}
