// Quiz service HTTP client.
// Handles base URL resolution, JSON bodies, version headers and response status mapping.

use std::time::Duration;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, IF_MATCH, USER_AGENT},
};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{QuizError, Result};

/// JSON-over-HTTP client bound to one quiz service.
#[derive(Debug, Clone)]
pub struct QuizClient {
    client: Client,
    base_url: String,
}

impl QuizClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("quizdesk"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(QuizError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Make a GET request.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.send(self.client.get(self.url(endpoint)), "GET", endpoint)
            .await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Response> {
        self.send(self.client.post(self.url(endpoint)).json(body), "POST", endpoint)
            .await
    }

    /// Make a PUT request with a JSON body, optionally guarded by an `If-Match` version.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
        if_match: Option<u64>,
    ) -> Result<Response> {
        let mut request = self.client.put(self.url(endpoint)).json(body);
        if let Some(version) = if_match {
            request = request.header(IF_MATCH, format!("\"{}\"", version));
        }
        self.send(request, "PUT", endpoint).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, endpoint: &str) -> Result<Response> {
        self.send(self.client.delete(self.url(endpoint)), "DELETE", endpoint)
            .await
    }

    async fn send(&self, request: RequestBuilder, method: &str, endpoint: &str) -> Result<Response> {
        debug!(method, endpoint, "quiz service request");
        let response = request.send().await.map_err(QuizError::Transport)?;
        check_response(response).await
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::NOT_FOUND {
        if body.trim().is_empty() {
            return Err(QuizError::NotFound(url));
        }
        return Err(QuizError::NotFound(format!(
            "{}: {}",
            url,
            error_message(status, &body)
        )));
    }

    Err(QuizError::Service {
        status,
        message: error_message(status, &body),
    })
}

/// Extract the service's error payload, falling back to a generic message.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {}", status);
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }

    body.to_string()
}
