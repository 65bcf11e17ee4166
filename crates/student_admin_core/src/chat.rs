//! crates/student_admin_core/src/chat.rs
//!
//! The help chat: a running transcript, a few canned starter questions, and
//! the logic for turning whatever the chatbot endpoint returns into one line
//! of reply text.

use crate::ports::ChatService;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

pub const GREETING: &str = "Hello! How can I help you today?";
pub const FALLBACK_REPLY: &str = "I received your message, but couldn't process it.";
pub const CONNECTION_TROUBLE: &str = "Sorry, I'm having trouble connecting. Please try again later.";

pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "How do I add a new student?",
    "How do I edit student information?",
    "How do I delete a student?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    pub is_error: bool,
}

/// Picks the reply text out of a chatbot response body.
pub fn extract_reply(body: &Value) -> String {
    let text_at = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match body {
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => text_at(body.get("message"))
            .or_else(|| text_at(body.get("response")))
            .or_else(|| text_at(body.get("text")))
            .or_else(|| text_at(body.get("data").and_then(|d| d.get("message"))))
            .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
    }
}

/// One chat conversation. `send` takes `&mut self`, so a second message can
/// not be started while the first is still waiting on the endpoint.
pub struct ChatSession {
    service: Arc<dyn ChatService>,
    messages: Vec<ChatMessage>,
    show_suggestions: bool,
    next_id: u64,
}

impl ChatSession {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        let mut session = Self {
            service,
            messages: Vec::new(),
            show_suggestions: true,
            next_id: 1,
        };
        session.push(GREETING.to_string(), Sender::Bot, false);
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Starter questions, offered only until the first message goes out.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.show_suggestions {
            &SUGGESTED_QUESTIONS
        } else {
            &[]
        }
    }

    /// Sends `text` and returns the bot's answer, or `None` if there was
    /// nothing to send.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.show_suggestions = false;
        self.push(text.to_string(), Sender::User, false);

        match self.service.send_message(text).await {
            Ok(body) => {
                let reply = extract_reply(&body);
                self.push(reply, Sender::Bot, false);
            }
            Err(e) => {
                error!("Chat error: {}", e);
                let reply = if e.message.is_empty() {
                    CONNECTION_TROUBLE.to_string()
                } else {
                    e.message
                };
                self.push(reply, Sender::Bot, true);
            }
        }
        self.messages.last()
    }

    /// Sends one of the starter questions by index.
    pub async fn send_suggestion(&mut self, index: usize) -> Option<&ChatMessage> {
        let question = *self.suggestions().get(index)?;
        self.send(question).await
    }

    fn push(&mut self, text: String, sender: Sender, is_error: bool) {
        self.messages.push(ChatMessage {
            id: self.next_id,
            text,
            sender,
            timestamp: Local::now(),
            is_error,
        });
        self.next_id += 1;
    }
}
