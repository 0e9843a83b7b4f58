//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::auth::loopback::{read_request, write_response, HttpRequest};
use crate::auth::{AuthError, PopupController, ProfileSource, ProviderProfile};
use crate::storage::{KeyValueStore, MemoryStore, StorageError};

/// A store whose operations fail on demand. `Default` fails everything.
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: bool,
    fail_removes: bool,
}

impl Default for FailingStore {
    fn default() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_reads: true,
            fail_writes: true,
            fail_removes: true,
        }
    }
}

impl FailingStore {
    /// Reads and writes work, removals fail
    pub fn removals_only() -> Self {
        Self {
            fail_reads: false,
            fail_writes: false,
            ..Self::default()
        }
    }

    fn failure() -> StorageError {
        StorageError::Backend("simulated failure".to_string())
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(Self::failure());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(Self::failure());
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_removes {
            return Err(Self::failure());
        }
        self.inner.remove(key)
    }
}

/// Returns the `u1` / `a@b.com` profile for `tok123` and counts lookups.
#[derive(Default)]
pub struct FixedProfile {
    pub status: Option<u16>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ProfileSource for FixedProfile {
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.status {
            return Err(AuthError::ProfileFetch { status });
        }
        assert_eq!(access_token, "tok123");
        Ok(ProviderProfile {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            given_name: Some("A".to_string()),
            family_name: Some("B".to_string()),
        })
    }
}

pub async fn wait_until_listening(controller: &PopupController) {
    for _ in 0..200 {
        if controller.is_listening() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("popup never opened");
}

/// A port nothing is listening on right now
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Serve one canned JSON response on a local port.
/// Returns the base URL and the request that was received.
pub async fn spawn_responder(
    status: u16,
    body: &'static str,
) -> (String, oneshot::Receiver<HttpRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await.unwrap();
        write_response(&mut socket, status, "application/json", body)
            .await
            .unwrap();
        let _ = tx.send(request);
    });

    (base, rx)
}
