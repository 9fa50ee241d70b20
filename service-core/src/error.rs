use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    /// A backing service failed. The first field is the caller-facing message;
    /// the cause is only ever logged.
    #[error("{0}: {1}")]
    DependencyFailed(&'static str, anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// JSON envelope written for every failed request.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DependencyFailed(..)
            | AppError::InternalError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the caller-facing body, logging whatever detail is withheld.
    ///
    /// Internal errors expose only their outermost description; the full
    /// `anyhow` chain goes to the log.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            AppError::BadRequest(err) => {
                tracing::warn!(error = %err, "Rejected request");
                ErrorBody {
                    error: "Invalid request body".to_string(),
                    message: Some(err.to_string()),
                }
            }
            AppError::ValidationError(err) => {
                tracing::warn!(error = %err, "Request failed validation");
                ErrorBody {
                    error: "Invalid request body".to_string(),
                    message: Some(err.to_string()),
                }
            }
            AppError::NotFound(_) => ErrorBody {
                error: "Not found".to_string(),
                message: None,
            },
            AppError::DependencyFailed(public, err) => {
                tracing::error!(error = format!("{:#}", err), "{}", public);
                ErrorBody {
                    error: (*public).to_string(),
                    message: None,
                }
            }
            AppError::InternalError(err) => {
                tracing::error!(error = format!("{:#}", err), "Error processing request");
                ErrorBody {
                    error: "Internal server error".to_string(),
                    message: Some(err.to_string()),
                }
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = format!("{:#}", err), "Configuration error");
                ErrorBody {
                    error: "Configuration error".to_string(),
                    message: None,
                }
            }
        }
    }
}
