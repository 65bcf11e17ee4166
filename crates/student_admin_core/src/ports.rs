//! crates/student_admin_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core logic talks to.
//! These traits are the boundary of the hexagon: the REST adapters in the
//! `admin` service implement them, tests implement them in memory.

use crate::domain::{Class, RecordId, Student, StudentCreateUpdateRequest};
use async_trait::async_trait;
use serde_json::Value;

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Fallback text when neither the server nor the transport said anything useful.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Where an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (unreachable host, timeout, ...).
    Transport,
    /// The server answered with a non-success status, or an unusable body.
    Application,
}

/// The single error shape surfaced by every port operation.
///
/// Mirrors the envelope callers display: a human-readable `message`, the HTTP
/// `status` when there was a response, and whatever body came back as `data`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct PortError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub data: Option<Value>,
}

impl PortError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: non_empty_or_generic(message.into()),
            status: None,
            data: None,
        }
    }

    pub fn application(message: impl Into<String>, status: Option<u16>, data: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Application,
            message: non_empty_or_generic(message.into()),
            status,
            data,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

fn non_empty_or_generic(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Student endpoints. List responses are returned as the raw envelope so the
/// caller can run it through `normalize` before decoding.
#[async_trait]
pub trait StudentService: Send + Sync {
    async fn list_students(&self, page: usize, page_size: usize) -> PortResult<Value>;

    async fn get_student(&self, id: &RecordId) -> PortResult<Student>;

    /// Returns the created record when the server echoed one back.
    async fn create_student(&self, request: &StudentCreateUpdateRequest) -> PortResult<Option<Student>>;

    async fn update_student(
        &self,
        id: &RecordId,
        request: &StudentCreateUpdateRequest,
    ) -> PortResult<Option<Student>>;

    async fn delete_student(&self, id: &RecordId) -> PortResult<()>;
}

#[async_trait]
pub trait ClassService: Send + Sync {
    /// Raw collection envelope, same treatment as `list_students`.
    async fn list_classes(&self) -> PortResult<Value>;

    async fn get_class(&self, id: &RecordId) -> PortResult<Class>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Sends one user message and returns the chatbot's raw reply body.
    async fn send_message(&self, message: &str) -> PortResult<Value>;
}
