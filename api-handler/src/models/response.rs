//! Outbound response envelope and the CORS header set.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use service_core::error::AppError;
use std::collections::HashMap;

/// Headers attached to every response, success or failure.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// Fallback body if an error envelope itself fails to serialize.
const FALLBACK_ERROR_BODY: &str = r#"{"error":"Internal server error"}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl OutboundResponse {
    /// Serialize `body` as JSON under `status`.
    pub fn json<T: Serialize + ?Sized>(
        status: StatusCode,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: status.as_u16(),
            headers: cors_headers(),
            body: serde_json::to_string(body)?,
        })
    }

    pub fn from_error(err: &AppError) -> Self {
        let body = serde_json::to_string(&err.to_body())
            .unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_string());
        Self {
            status_code: err.status_code().as_u16(),
            headers: cors_headers(),
            body,
        }
    }
}

impl From<AppError> for OutboundResponse {
    fn from(err: AppError) -> Self {
        OutboundResponse::from_error(&err)
    }
}

pub fn cors_headers() -> HashMap<String, String> {
    CORS_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut res = (status, self.body).into_response();

        let headers = res.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    fn assert_cors(headers: &HashMap<String, String>) {
        for (name, value) in CORS_HEADERS {
            assert_eq!(headers.get(name).map(String::as_str), Some(value), "{}", name);
        }
    }

    #[test]
    fn json_response_carries_cors_headers() {
        let res = OutboundResponse::json(StatusCode::OK, &json!({"result": "hello"})).unwrap();
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, r#"{"result":"hello"}"#);
        assert_cors(&res.headers);
    }

    #[test]
    fn error_response_carries_cors_headers() {
        let res = OutboundResponse::from(AppError::NotFound(anyhow!("DELETE /api/data")));
        assert_eq!(res.status_code, 404);
        assert_eq!(res.body, r#"{"error":"Not found"}"#);
        assert_cors(&res.headers);
    }

    #[test]
    fn into_response_copies_status_and_headers() {
        let res = OutboundResponse::json(StatusCode::NOT_FOUND, &json!({"error": "Not found"}))
            .unwrap()
            .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert_eq!(res.headers()["content-type"], "application/json");
    }
}
