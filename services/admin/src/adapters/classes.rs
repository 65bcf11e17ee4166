//! services/admin/src/adapters/classes.rs
//!
//! This module contains the REST adapter for the read-only `/Class` endpoints.

use crate::adapters::http::HttpClient;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use student_admin_core::decode;
use student_admin_core::domain::{Class, RecordId};
use student_admin_core::ports::{ClassService, PortError, PortResult};

#[derive(Clone)]
pub struct RestClassAdapter {
    http: Arc<HttpClient>,
}

impl RestClassAdapter {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ClassService for RestClassAdapter {
    async fn list_classes(&self) -> PortResult<Value> {
        self.http.get("/Class", &[]).await
    }

    async fn get_class(&self, id: &RecordId) -> PortResult<Class> {
        let body = self.http.get(&self.http.item_url("/Class", &id.to_string())?, &[]).await?;
        decode::class(body).map_err(|e| PortError::application(e.to_string(), None, None))
    }
}
