//! REST client for the storefront API.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    api::ApiError,
    storage::{KeyValueStore, TOKEN_KEY, read_json},
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the storefront API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `"https://swiftshop-backend.onrender.com"`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client that attaches the stored session token to every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        debug!(base_url = %config.base_url, "api client configured");

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching `Authorization: Bearer` when a token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored token cannot be read.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path);

        debug!(%method, %url, "api request");

        let builder = self.http.request(method, url);

        match read_json::<String>(self.storage.as_ref(), TOKEN_KEY)? {
            Some(token) => {
                let token = Zeroizing::new(token);

                Ok(builder.bearer_auth(token.as_str()))
            }
            None => Ok(builder),
        }
    }

    /// Send a request and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status or an undecodable body.
    pub async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;

        Ok(response.json().await?)
    }

    /// Send a request and discard the body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn execute_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(drop)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)?).await
    }

    /// `GET` a JSON resource with query parameters.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::GET, path)?.query(query))
            .await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await
    }

    /// `PUT` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path)?.json(body))
            .await
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute_unit`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute_unit(self.request(Method::DELETE, path)?).await
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.inspect_err(|error| {
            warn!(base_url = %self.base_url, "no response from server: {error}");
        })?;

        let status = response.status();
        let url = response.url().clone();

        if status.is_success() {
            debug!(%status, %url, "api response");

            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = error_detail(&text);

        warn!(%status, %url, detail = detail.as_deref().unwrap_or(""), "api request failed");

        Err(ApiError::Status { status, detail })
    }
}

/// Pull the human-readable `detail` out of an error body.
///
/// Accepts `{"detail": "..."}`, validation lists (`{"detail": [{"msg": "..."}]}`) and plain text.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();

    if body.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };

    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();

            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}
