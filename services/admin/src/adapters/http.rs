//! services/admin/src/adapters/http.rs
//!
//! A thin wrapper over `reqwest` shared by all REST adapters. Every failure,
//! whether the request never got a response or the server answered with an
//! error status, leaves this module as a `PortError` with a readable message.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use student_admin_core::ports::{PortError, PortResult, GENERIC_ERROR_MESSAGE};
use tracing::{debug, error};

//=========================================================================================
// The Main Client Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Creates a client resolving relative paths against `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URLs pass through; anything else is appended to the base.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of one item under `collection`, the id encoded as a single path segment.
    pub fn item_url(&self, collection: &str, id: &str) -> PortResult<String> {
        let mut url = Url::parse(&self.url(collection))
            .map_err(|e| PortError::transport(format!("Invalid URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PortError::transport("Base URL cannot take a path"))?
            .pop_if_empty()
            .push(id);
        Ok(url.to_string())
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> PortResult<Value> {
        let url = self.url(path);
        let request = self.client.get(&url).query(query);
        self.send(Method::GET, &url, request).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> PortResult<Value> {
        let url = self.url(path);
        let request = self.client.post(&url).json(body);
        self.send(Method::POST, &url, request).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> PortResult<Value> {
        let url = self.url(path);
        let request = self.client.put(&url).json(body);
        self.send(Method::PUT, &url, request).await
    }

    pub async fn delete(&self, path: &str) -> PortResult<Value> {
        let url = self.url(path);
        let request = self.client.delete(&url);
        self.send(Method::DELETE, &url, request).await
    }

    async fn send(&self, method: Method, url: &str, request: RequestBuilder) -> PortResult<Value> {
        debug!("[API Request] {} {}", method, url);

        let response = request.send().await.map_err(|e| {
            error!("[API Error] {} {} failed: {}", method, url, e);
            PortError::transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::transport(e.to_string()))?;

        if status.is_success() {
            return Ok(parse_body(&body));
        }

        let transport_message = format!("Request failed with status code {}", status.as_u16());
        let err = normalize_error(Some(status.as_u16()), &body, &transport_message);
        error!("[API Error] {} {:?}", err.message, err.status);
        Err(err)
    }
}

//=========================================================================================
// Body and Error Normalization
//=========================================================================================

/// Success bodies: JSON when it parses, the raw text otherwise, `Null` if empty.
pub fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Builds the error envelope for a failed response.
///
/// The message comes from, in order: a JSON object's `message` or `title`,
/// a fixed text per status for HTML error pages, a plain-text body verbatim,
/// and finally the transport's own description.
pub fn normalize_error(status: Option<u16>, body: &str, transport_message: &str) -> PortError {
    let fallback = || {
        if transport_message.is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            transport_message.to_string()
        }
    };

    let data = parse_body(body);
    let message = match &data {
        Value::Object(object) => ["message", "title"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(fallback),
        Value::String(text) if is_html(text) => match status {
            Some(500) => "Internal server error".to_string(),
            Some(404) => "Service not found".to_string(),
            Some(502) | Some(503) => "Service temporarily unavailable".to_string(),
            _ => fallback(),
        },
        Value::String(text) if !text.is_empty() => text.clone(),
        _ => fallback(),
    };

    let data = match data {
        Value::Null => None,
        other => Some(other),
    };
    PortError::application(message, status, data)
}

fn is_html(text: &str) -> bool {
    text.contains("<!DOCTYPE") || text.contains("<html")
}
