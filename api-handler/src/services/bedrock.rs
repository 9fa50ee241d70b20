//! Bedrock model invocation.
//!
//! Wraps a prompt in the Anthropic messages payload, sends it through
//! `InvokeModel`, and pulls the text of the first content block out of the
//! response.

use super::{InvocationError, ModelInvoker};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::{Deserialize, Serialize};

/// Messages API version tag expected by Anthropic models on Bedrock.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Upper bound on generated tokens per call.
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// Bedrock Runtime adapter. Cheap to clone; the SDK client is shared.
#[derive(Clone)]
pub struct BedrockModelInvoker {
    client: Client,
    model_id: String,
}

impl BedrockModelInvoker {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ModelInvoker for BedrockModelInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String, InvocationError> {
        let payload = encode_payload(prompt)?;

        tracing::info!(
            model_id = %self.model_id,
            prompt_len = prompt.len(),
            "Invoking Bedrock model"
        );

        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| InvocationError::Service(Box::new(e)))?;

        extract_text(output.body().as_ref())
    }
}

#[derive(Debug, Serialize)]
struct ModelInvocationPayload<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModelResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

fn encode_payload(prompt: &str) -> Result<Vec<u8>, InvocationError> {
    let payload = ModelInvocationPayload {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: MAX_OUTPUT_TOKENS,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
    };
    serde_json::to_vec(&payload).map_err(InvocationError::Encode)
}

fn extract_text(body: &[u8]) -> Result<String, InvocationError> {
    let response: ModelResponse = serde_json::from_slice(body).map_err(InvocationError::Decode)?;

    response
        .content
        .into_iter()
        .next()
        .ok_or(InvocationError::EmptyContent)?
        .text
        .ok_or(InvocationError::MissingText)
}
