//! services/admin/src/adapters/students.rs
//!
//! This module contains the REST adapter for the `/Student` endpoints.
//! It implements the `StudentService` port from the `core` crate.

use crate::adapters::http::HttpClient;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use student_admin_core::decode;
use student_admin_core::domain::{RecordId, Student, StudentCreateUpdateRequest};
use student_admin_core::ports::{PortError, PortResult, StudentService};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StudentService` over HTTP.
#[derive(Clone)]
pub struct RestStudentAdapter {
    http: Arc<HttpClient>,
}

impl RestStudentAdapter {
    /// Creates a new `RestStudentAdapter`.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn item_url(&self, id: &RecordId) -> PortResult<String> {
        self.http.item_url("/Student", &id.to_string())
    }

    /// The create/update endpoints may or may not echo the record back.
    fn echoed(body: Value) -> Option<Student> {
        if body.is_null() {
            return None;
        }
        match decode::student(body) {
            Ok(student) => Some(student),
            Err(e) => {
                warn!("Ignoring unreadable student in mutation response: {}", e);
                None
            }
        }
    }
}

//=========================================================================================
// `StudentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudentService for RestStudentAdapter {
    async fn list_students(&self, page: usize, page_size: usize) -> PortResult<Value> {
        self.http
            .get(
                "/Student",
                &[("page", page.to_string()), ("pageSize", page_size.to_string())],
            )
            .await
    }

    async fn get_student(&self, id: &RecordId) -> PortResult<Student> {
        let body = self.http.get(&self.item_url(id)?, &[]).await?;
        decode::student(body).map_err(|e| PortError::application(e.to_string(), None, None))
    }

    async fn create_student(&self, request: &StudentCreateUpdateRequest) -> PortResult<Option<Student>> {
        let body = self.http.post("/Student", request).await?;
        Ok(Self::echoed(body))
    }

    async fn update_student(
        &self,
        id: &RecordId,
        request: &StudentCreateUpdateRequest,
    ) -> PortResult<Option<Student>> {
        let body = self.http.put(&self.item_url(id)?, request).await?;
        Ok(Self::echoed(body))
    }

    async fn delete_student(&self, id: &RecordId) -> PortResult<()> {
        self.http.delete(&self.item_url(id)?).await?;
        Ok(())
    }
}
