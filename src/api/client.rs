use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use super::{
    FetchError, FetchRequest, FETCH_PATH, FETCH_SOURCE_PATH, IMPORT_PATH, MAX_RESPONSE_SIZE,
};
use crate::article::Article;
use crate::util::{validate_source_url, MAX_INPUT_LENGTH};

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Client for the `/apps/news` backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NewsClient {
    /// Builds a client for the backend at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .redirect(create_redirect_policy())
            .build()?;
        Self::with_http_client(http, base_url)
    }

    /// Uses a caller-provided `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Result<Self, FetchError> {
        let mut base =
            Url::parse(base_url.trim()).map_err(|e| FetchError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(FetchError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                base.scheme()
            )));
        }
        // Endpoint paths are joined relative to the base, so it must end in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { http, base_url: base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidBaseUrl(e.to_string()))
    }

    /// Fetches articles for `request.category`.
    ///
    /// On success returns the envelope's `data` array; a missing, null or
    /// non-array `data` is an empty result, not an error.
    ///
    /// A custom source URL is checked against [`validate_source_url`] before
    /// anything is sent. Refusing localhost and private ranges is this
    /// client's own policy; the backend accepts any `api_url` value.
    pub async fn fetch_articles(&self, request: &FetchRequest) -> Result<Vec<Article>, FetchError> {
        if let Some(source) = request.custom_source_url.as_deref() {
            validate_source_url(source)?;
        }
        if request
            .search_term
            .as_deref()
            .is_some_and(|t| t.len() > MAX_INPUT_LENGTH)
        {
            return Err(FetchError::InputTooLong(MAX_INPUT_LENGTH));
        }

        let url = request.to_url(&self.endpoint(FETCH_PATH)?);
        tracing::debug!(
            category = %request.category,
            search = request.search_term.is_some(),
            custom_source = request.custom_source_url.is_some(),
            "Fetching articles"
        );

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = read_body(response, status).await?;

        if !status.is_success() {
            return Err(http_status_error(status, &body));
        }

        let envelope = parse_envelope(&body)?;
        if !is_success(&envelope) {
            return Err(FetchError::Application(
                error_message(&envelope).unwrap_or_else(|| "Failed to fetch news".to_string()),
            ));
        }

        let articles = match envelope.get("data") {
            Some(Value::Array(items)) => items.iter().cloned().map(Article::from).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                tracing::warn!(kind = json_kind(other), "Ignoring non-array data in response");
                Vec::new()
            }
        };
        tracing::debug!(count = articles.len(), "Fetched articles");
        Ok(articles)
    }

    /// Admin lookup of a source record. Returns the `source` object as-is.
    ///
    /// Only the body's `success` flag decides the outcome; the HTTP status is
    /// consulted only when the body is not JSON.
    pub async fn fetch_source(&self, id: &str) -> Result<Value, FetchError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(FetchError::EmptyInput("Please enter a source ID"));
        }
        if id.len() > MAX_INPUT_LENGTH {
            return Err(FetchError::InputTooLong(MAX_INPUT_LENGTH));
        }

        let mut url = self.endpoint(FETCH_SOURCE_PATH)?;
        url.query_pairs_mut().append_pair("id", id);
        tracing::debug!(id, "Fetching source details");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = read_body(response, status).await?;
        let envelope = parse_admin_envelope(status, &body)?;

        if is_success(&envelope) {
            Ok(envelope.get("source").cloned().unwrap_or(Value::Null))
        } else {
            Err(FetchError::Application(
                error_message(&envelope).unwrap_or_else(|| "Source not found".to_string()),
            ))
        }
    }

    /// Admin import. `data` is forwarded untouched as the `data` form field;
    /// returns the number of imported items the backend reports.
    pub async fn import_data(&self, data: &str) -> Result<u64, FetchError> {
        let data = data.trim();
        if data.is_empty() {
            return Err(FetchError::EmptyInput("Please enter base64 encoded data"));
        }

        let url = self.endpoint(IMPORT_PATH)?;
        tracing::debug!(bytes = data.len(), "Importing news data");

        let response = self.http.post(url).form(&[("data", data)]).send().await?;
        let status = response.status();
        let body = read_body(response, status).await?;
        let envelope = parse_admin_envelope(status, &body)?;

        if is_success(&envelope) {
            let count = envelope.get("count").and_then(Value::as_u64).unwrap_or(0);
            tracing::info!(count, "Import succeeded");
            Ok(count)
        } else {
            Err(FetchError::Application(
                error_message(&envelope).unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

fn parse_envelope(body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
}

fn parse_admin_envelope(status: StatusCode, body: &[u8]) -> Result<Value, FetchError> {
    match serde_json::from_slice(body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Err(http_status_error(status, body)),
        Err(e) => Err(FetchError::InvalidResponse(e.to_string())),
    }
}

fn is_success(envelope: &Value) -> bool {
    envelope.get("success").and_then(Value::as_bool) == Some(true)
}

fn error_message(envelope: &Value) -> Option<String> {
    envelope
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Message from a JSON `{"error": ...}` body, else a generic status message.
fn http_status_error(status: StatusCode, body: &[u8]) -> FetchError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()));
    tracing::warn!(status = status.as_u16(), message = %message, "Backend returned error status");
    FetchError::HttpStatus {
        status: status.as_u16(),
        message,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads the body under the size cap. For error statuses an unreadable or
/// oversized body counts as empty, so the status code still reaches the caller.
async fn read_body(response: reqwest::Response, status: StatusCode) -> Result<Vec<u8>, FetchError> {
    match read_limited_bytes(response, MAX_RESPONSE_SIZE).await {
        Ok(body) => Ok(body),
        Err(e) if !status.is_success() => {
            tracing::debug!(status = status.as_u16(), error = %e, "Discarding error response body");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
