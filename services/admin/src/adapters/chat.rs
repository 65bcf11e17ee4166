//! services/admin/src/adapters/chat.rs
//!
//! This module contains the adapter for the chatbot endpoint.
//! It implements the `ChatService` port from the `core` crate.

use crate::adapters::http::HttpClient;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use student_admin_core::ports::{ChatService, PortResult};
use tracing::warn;

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// An adapter that implements `ChatService` by posting `{message}` to a
/// fixed endpoint.
#[derive(Clone)]
pub struct RestChatAdapter {
    http: Arc<HttpClient>,
    endpoint: String,
    not_found_retries: u32,
}

impl RestChatAdapter {
    /// Creates a new `RestChatAdapter`.
    ///
    /// A 404 from the endpoint is retried up to `not_found_retries` more
    /// times before it is reported.
    pub fn new(http: Arc<HttpClient>, endpoint: String, not_found_retries: u32) -> Self {
        Self {
            http,
            endpoint,
            not_found_retries,
        }
    }
}

#[async_trait]
impl ChatService for RestChatAdapter {
    async fn send_message(&self, message: &str) -> PortResult<Value> {
        let request = ChatRequest { message };
        let mut attempt = 0;
        loop {
            match self.http.post(&self.endpoint, &request).await {
                Err(e) if e.is_not_found() && attempt < self.not_found_retries => {
                    attempt += 1;
                    warn!("Chat endpoint returned 404, retrying ({}/{})", attempt, self.not_found_retries);
                }
                result => return result,
            }
        }
    }
}
