//! API client for the SeniorHub backend.
//!
//! Every call takes a `RequestContext`; the client adds the identity headers,
//! logs failures and returns them. Requests are never retried.

use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Config;

use super::{ApiError, RequestContext};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Response envelope used by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub status: ApiStatus,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// The payload of a successful envelope
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.status, self.data) {
            (ApiStatus::Success, Some(data)) => Ok(data),
            (ApiStatus::Success, None) => Err(ApiError::InvalidResponse(
                "Success response without data".to_string(),
            )),
            (ApiStatus::Error, _) => Err(ApiError::Envelope(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }
}

/// API client for the SeniorHub backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(default_headers)
            .build()?;

        let base_url = format!(
            "{}/{}",
            config.api_url.trim_end_matches('/'),
            config.api_version.trim_matches('/')
        );

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, ctx: &RequestContext, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(ctx, Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(ctx, Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, ctx: &RequestContext, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(ctx, Method::DELETE, path, None).await
    }

    /// GET an enveloped response and unwrap its data
    pub async fn fetch_data<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> Result<T, ApiError> {
        let envelope: ApiResponse<T> = self.get(ctx, path).await?;
        envelope.into_result().inspect_err(|e| {
            error!(path = path, error = %e, "[API Error] Request rejected by backend");
        })
    }

    async fn request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .headers(ctx.headers());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(method = %method, url = %url, "API request");
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_builder() {
                    error!(url = %url, error = %e, "[API Error] Setup");
                } else {
                    error!(url = %url, error = %e, "[API Error] No response");
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                data = %ApiError::truncate_body(&body),
                url = %url,
                "[API Error]"
            );
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            error!(url = %url, error = %e, "[API Error] Unparsable response body");
            ApiError::InvalidResponse(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::models::Session;
    use crate::test_support::{free_port, spawn_responder};

    fn client_for(base: &str) -> ApiClient {
        let config = Config {
            api_url: base.to_string(),
            api_version: "v1".to_string(),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_joins_version_and_path() {
        let client = client_for("http://localhost:4000/");
        assert_eq!(client.base_url(), "http://localhost:4000/v1");
        assert_eq!(client.url("/households"), "http://localhost:4000/v1/households");
        assert_eq!(client.url("households/1"), "http://localhost:4000/v1/households/1");
    }

    #[test]
    fn test_envelope_into_result() {
        let ok: ApiResponse<Vec<u32>> =
            serde_json::from_value(json!({"status": "success", "data": [1, 2]})).unwrap();
        assert_eq!(ok.into_result().unwrap(), vec![1, 2]);

        let err: ApiResponse<Value> =
            serde_json::from_value(json!({"status": "error", "error": "Household not found"})).unwrap();
        assert!(matches!(err.into_result(), Err(ApiError::Envelope(ref m)) if m == "Household not found"));

        let empty: ApiResponse<Value> = serde_json::from_value(json!({"status": "success"})).unwrap();
        assert!(matches!(empty.into_result(), Err(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_session_headers_are_attached() {
        let (base, request) = spawn_responder(200, r#"{"ok": true}"#).await;
        let client = client_for(&base);
        let ctx = RequestContext::from_session(&Session::demo());

        let body: Value = client.get(&ctx, "/households").await.unwrap();
        assert_eq!(body, json!({"ok": true}));

        let request = request.await.unwrap();
        assert_eq!(request.path, "/v1/households");
        assert_eq!(request.header("authorization"), Some("Bearer demo-token"));
        assert_eq!(request.header("x-user-id"), Some("demo-user"));
        assert_eq!(request.header("x-user-email"), Some("demo@seniorhub.com"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_identity() {
        let (base, request) = spawn_responder(200, "{}").await;
        let client = client_for(&base);

        let _: Value = client.get(&RequestContext::anonymous(), "health").await.unwrap();

        let request = request.await.unwrap();
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.header("x-user-id"), None);
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let (base, request) = spawn_responder(201, r#"{"status": "success", "data": {"id": "h1"}}"#).await;
        let client = client_for(&base);

        let created: ApiResponse<Value> = client
            .post(&RequestContext::anonymous(), "households", &json!({"name": "Home"}))
            .await
            .unwrap();
        assert_eq!(created.into_result().unwrap()["id"], "h1");

        let request = request.await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(serde_json::from_str::<Value>(&request.body).unwrap(), json!({"name": "Home"}));
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_retried() {
        let (base, _request) = spawn_responder(401, r#"{"error": "expired"}"#).await;
        let client = client_for(&base);

        let err = client
            .get::<Value>(&RequestContext::anonymous(), "households")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_fetch_data_unwraps_envelope() {
        let (base, _request) =
            spawn_responder(200, r#"{"status": "success", "data": ["a", "b"]}"#).await;
        let client = client_for(&base);

        let data: Vec<String> = client
            .fetch_data(&RequestContext::anonymous(), "reminders")
            .await
            .unwrap();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let client = client_for(&format!("http://127.0.0.1:{}", free_port()));
        let err = client
            .delete::<Value>(&RequestContext::anonymous(), "households/1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(_)));
    }
}
