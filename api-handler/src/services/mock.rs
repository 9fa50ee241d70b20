//! Mock adapters for tests and `HANDLER_BACKEND=mock` local runs.

use super::{InvocationError, ModelInvoker, QueryError, TabularQuery};
use crate::models::{FieldValue, QueryResult, QueryRow};
use async_trait::async_trait;

/// Mock model invoker.
pub struct MockModelInvoker {
    enabled: bool,
    reply: Option<String>,
}

impl MockModelInvoker {
    /// Echoes the prompt back when enabled; fails every call otherwise.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            reply: None,
        }
    }

    /// Always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            enabled: true,
            reply: Some(reply.into()),
        }
    }
}

#[async_trait]
impl ModelInvoker for MockModelInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String, InvocationError> {
        if !self.enabled {
            return Err(InvocationError::Service(
                "Mock model invoker not enabled".into(),
            ));
        }

        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| format!("Mock response for: {}", prompt)))
    }
}

/// Mock data store.
pub struct MockTabularQuery {
    enabled: bool,
    rows: QueryResult,
}

impl MockTabularQuery {
    /// Serves two sample rows when enabled; fails every call otherwise.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            rows: sample_rows(),
        }
    }

    pub fn with_rows(rows: QueryResult) -> Self {
        Self {
            enabled: true,
            rows,
        }
    }
}

#[async_trait]
impl TabularQuery for MockTabularQuery {
    async fn query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        if !self.enabled {
            return Err(QueryError::Execution(
                format!("Mock data store not enabled (sql: {})", sql).into(),
            ));
        }

        Ok(self.rows.clone())
    }
}

fn sample_rows() -> QueryResult {
    [(1, "alpha"), (2, "beta")]
        .into_iter()
        .map(|(id, name)| {
            QueryRow::from([
                ("id".to_string(), FieldValue::Integer(id)),
                ("name".to_string(), FieldValue::String(name.to_string())),
            ])
        })
        .collect()
}
