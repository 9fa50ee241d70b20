//! API handler routing `/api/bedrock` and `/api/data` to Bedrock and the
//! RDS Data API.

pub mod config;
pub mod lambda;
pub mod models;
pub mod router;
pub mod services;
pub mod startup;
