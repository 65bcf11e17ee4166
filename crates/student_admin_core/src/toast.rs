//! crates/student_admin_core/src/toast.rs
//!
//! Transient notifications raised by the controller.

pub const STUDENT_CREATED: &str = "Student created successfully!";
pub const STUDENT_UPDATED: &str = "Student updated successfully!";
pub const STUDENT_DELETED: &str = "Student deleted successfully!";
pub const SAVE_FAILED: &str = "Failed to save student. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete student. Please try again.";
pub const LOAD_FAILED: &str = "Failed to load students. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error)
    }
}
