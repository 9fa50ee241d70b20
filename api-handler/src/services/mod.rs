//! Backing-service adapters.
//!
//! The router only sees the [`ModelInvoker`] and [`TabularQuery`] traits, so
//! the Bedrock and RDS Data API implementations can be swapped for the mocks
//! in tests and local runs.

pub mod bedrock;
pub mod mock;
pub mod rds_data;

use crate::models::QueryResult;
use async_trait::async_trait;
use thiserror::Error;

pub use bedrock::BedrockModelInvoker;
pub use mock::{MockModelInvoker, MockTabularQuery};
pub use rds_data::RdsDataQuery;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to get generated text out of the inference service.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("Failed to encode model payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Inference service call failed: {0}")]
    Service(#[source] BoxError),

    #[error("Failed to parse model response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Model response contained no content blocks")]
    EmptyContent,

    #[error("First content block has no text")]
    MissingText,
}

/// Failure to execute a statement against the data service.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Statement execution failed: {0}")]
    Execution(#[source] BoxError),
}

/// Generates text from a single user prompt.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, InvocationError>;
}

/// Runs a SQL statement and returns uniformly decoded rows.
#[async_trait]
pub trait TabularQuery: Send + Sync {
    async fn query(&self, sql: &str) -> Result<QueryResult, QueryError>;
}
