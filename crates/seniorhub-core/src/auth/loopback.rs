//! Native popup transport: the system browser plus a local redirect target.
//!
//! The identity provider redirects to `http://127.0.0.1:<port>/auth/callback`
//! with the token in the URL fragment. The page served there relays the
//! fragment back as a JSON message to `/auth/relay` and reports its own
//! closing through a `/auth/closed` beacon. The browser's `Origin` header
//! becomes the message origin, so the manager's origin check still applies.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::transport::{AuthTransport, CrossWindowMessage, PopupEvent, PopupRequest, PopupSession};
use super::AuthError;

const RELAY_PATH: &str = "/auth/relay";
const CLOSED_PATH: &str = "/auth/closed";

/// Buffer size for popup events
const EVENT_BUFFER_SIZE: usize = 16;

/// Largest request body the relay accepts
const MAX_BODY_BYTES: usize = 64 * 1024;

type Launcher = dyn Fn(&str) -> std::io::Result<()> + Send + Sync;

pub struct LoopbackTransport {
    redirect_uri: Url,
    launcher: Arc<Launcher>,
}

impl LoopbackTransport {
    /// Opens the authorization URL with the platform's default browser
    pub fn new(redirect_uri: Url) -> Self {
        Self::with_launcher(redirect_uri, |url| open::that(url))
    }

    pub fn with_launcher<F>(redirect_uri: Url, launcher: F) -> Self
    where
        F: Fn(&str) -> std::io::Result<()> + Send + Sync + 'static,
    {
        Self {
            redirect_uri,
            launcher: Arc::new(launcher),
        }
    }

    fn port(&self) -> Result<u16, AuthError> {
        self.redirect_uri.port_or_known_default().ok_or_else(|| {
            AuthError::Transport(format!("Redirect URI has no port: {}", self.redirect_uri))
        })
    }
}

#[async_trait]
impl AuthTransport for LoopbackTransport {
    async fn open_auth_popup(&self, request: &PopupRequest) -> Result<PopupSession, AuthError> {
        let addr = format!("127.0.0.1:{}", self.port()?);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AuthError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        info!(addr = %addr, "Sign-in redirect target listening");

        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let routes = Arc::new(Routes {
            callback_path: self.redirect_uri.path().to_string(),
            origin: self.redirect_uri.origin().ascii_serialization(),
        });
        let server = tokio::spawn(serve(listener, tx, routes));

        // A system browser cannot be sized, so the geometry is informational only
        debug!(window = request.window_name, features = %request.geometry.features(), "Opening sign-in window");
        if let Err(e) = (self.launcher)(request.url.as_str()) {
            server.abort();
            warn!(error = %e, "Failed to open browser for sign-in");
            return Err(AuthError::PopupBlocked {
                reason: e.to_string(),
            });
        }

        Ok(PopupSession::new(rx).with_teardown(move || {
            server.abort();
            debug!("Sign-in redirect target stopped");
        }))
    }
}

struct Routes {
    callback_path: String,
    origin: String,
}

async fn serve(listener: TcpListener, tx: mpsc::Sender<PopupEvent>, routes: Arc<Routes>) {
    loop {
        match listener.accept().await {
            Ok((socket, _)) => {
                let tx = tx.clone();
                let routes = routes.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, tx, &routes).await {
                        error!(error = %e, "Error handling redirect target connection");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "Accept error");
                break;
            }
        }
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    tx: mpsc::Sender<PopupEvent>,
    routes: &Routes,
) -> std::io::Result<()> {
    let request = read_request(&mut socket).await?;
    debug!(method = %request.method, path = %request.path, "Redirect target request");
    let origin = request.header("origin").unwrap_or_default().to_string();

    match (request.method.as_str(), request.path.as_str()) {
        ("GET", path) if path == routes.callback_path => {
            write_response(&mut socket, 200, "text/html; charset=utf-8", RELAY_PAGE).await
        }
        ("POST", RELAY_PATH) => match serde_json::from_str(&request.body) {
            Ok(data) => {
                let _ = tx
                    .send(PopupEvent::Message(CrossWindowMessage { origin, data }))
                    .await;
                write_response(&mut socket, 204, "text/plain", "").await
            }
            Err(e) => {
                warn!(error = %e, "Unparsable relay message");
                write_response(&mut socket, 400, "text/plain", "Bad Request").await
            }
        },
        ("POST", CLOSED_PATH) => {
            if origin == routes.origin {
                let _ = tx.send(PopupEvent::Closed).await;
            } else {
                debug!(origin = %origin, "Ignoring close signal from untrusted origin");
            }
            write_response(&mut socket, 204, "text/plain", "").await
        }
        _ => write_response(&mut socket, 404, "text/plain", "Not Found").await,
    }
}

/// A parsed HTTP/1.1 request. Header names are lowercased; the path has no query.
#[derive(Debug, Clone)]
pub(crate) struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

pub(crate) async fn read_request(socket: &mut TcpStream) -> std::io::Result<HttpRequest> {
    let mut reader = BufReader::new(socket);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
        .min(MAX_BODY_BYTES);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;

    Ok(HttpRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

pub(crate) async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status: u16,
    content_type: &str,
    body: &str,
) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        body.len(),
        body
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await
}

const RELAY_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>SeniorHub - Signing in</title></head>
<body style="font-family: system-ui; text-align: center; padding: 50px; background: #F9FAFB;">
<div style="max-width: 400px; margin: 0 auto; background: white; padding: 32px; border-radius: 12px; box-shadow: 0 4px 6px -1px rgba(0,0,0,0.1);">
<h1 style="color: #111827;">SeniorHub</h1>
<p id="status" style="color: #6B7280;">Finishing sign-in...</p>
</div>
<script>
(function () {
  var params = new URLSearchParams(window.location.hash.slice(1));
  var token = params.get('access_token');
  var message = token
    ? { type: 'auth-success', access_token: token }
    : { type: 'auth-error', error: params.get('error_description') || params.get('error') || 'Authentication failed' };
  history.replaceState(null, '', window.location.pathname);
  window.addEventListener('pagehide', function () { navigator.sendBeacon('/auth/closed'); });
  fetch('/auth/relay', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(message)
  }).then(function () {
    document.getElementById('status').textContent = token
      ? 'Signed in. You can close this window.'
      : 'Sign-in failed. You can close this window and try again.';
    setTimeout(function () { window.close(); }, 1500);
  });
})();
</script>
</body>
</html>"#;
