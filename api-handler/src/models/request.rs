//! Inbound request shapes.

use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

/// Gateway-agnostic view of one HTTP call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub http_method: String,
    pub path: String,
    pub body: Option<String>,
    pub query_parameters: HashMap<String, String>,
    /// Correlation id for logs only; never affects routing.
    pub request_id: Option<String>,
}

impl InboundRequest {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_query_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Body of `POST /api/bedrock`.
#[derive(Debug, Deserialize, Validate)]
pub struct PromptRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
}
