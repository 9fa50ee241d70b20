use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Statement run by `GET /api/data` unless `DATA_QUERY` overrides it.
const DEFAULT_DATA_QUERY: &str = "SELECT * FROM your_table LIMIT 10";

#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub backend: Backend,
    pub aws: AwsConfig,
    pub model: ModelConfig,
    pub database: DatabaseConfig,
}

/// Which adapters the router is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Aws,
    Mock,
}

impl std::str::FromStr for Backend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Backend::Aws),
            "mock" => Ok(Backend::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "HANDLER_BACKEND must be 'aws' or 'mock', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Bedrock model identifier, e.g. `anthropic.claude-3-haiku-20240307-v1:0`.
    pub model_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Aurora cluster ARN the Data API executes against.
    pub cluster_arn: String,
    /// Secrets Manager ARN holding the database credentials.
    pub secret_arn: String,
    pub database: Option<String>,
    pub data_query: String,
}

impl HandlerConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: Backend = get_env("HANDLER_BACKEND", Some("aws"), is_prod)?.parse()?;

        // Mock backends never reach the Data API, so the ARNs may be absent.
        let arn_default = match backend {
            Backend::Mock => Some(""),
            Backend::Aws => None,
        };

        Ok(HandlerConfig {
            common: common_config,
            backend,
            aws: AwsConfig {
                region: get_env("AWS_REGION", Some("us-east-1"), is_prod)?,
            },
            model: ModelConfig {
                model_id: get_env(
                    "BEDROCK_MODEL_ID",
                    Some("anthropic.claude-3-haiku-20240307-v1:0"),
                    is_prod,
                )?,
            },
            database: DatabaseConfig {
                cluster_arn: get_env("DB_CLUSTER_ARN", arn_default, is_prod)?,
                secret_arn: get_env("DB_SECRET_ARN", arn_default, is_prod)?,
                database: env::var("DB_NAME").ok().filter(|s| !s.is_empty()),
                data_query: get_env("DATA_QUERY", Some(DEFAULT_DATA_QUERY), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
