//! Request routing and response shaping.
//!
//! [`RequestRouter::handle`] is the single entry point for both the Lambda
//! runtime and the local server. It always produces an [`OutboundResponse`]:
//! adapter failures, bad input, unknown routes and panics are all turned into
//! JSON error envelopes carrying the CORS headers.

use crate::models::{InboundRequest, OutboundResponse, PromptRequest, QueryResult};
use crate::services::{ModelInvoker, TabularQuery};
use anyhow::anyhow;
use axum::http::StatusCode;
use futures::FutureExt;
use serde::Serialize;
use service_core::error::AppError;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

const INVOKE_FAILED: &str = "Failed to invoke model";
const QUERY_FAILED: &str = "Failed to query data store";

/// Backing operation selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    InvokeModel,
    QueryData,
}

/// Exact, case-sensitive (method, path) table. First match wins.
const ROUTES: [(&str, &str, Route); 2] = [
    ("POST", "/api/bedrock", Route::InvokeModel),
    ("GET", "/api/data", Route::QueryData),
];

impl Route {
    pub fn resolve(method: &str, path: &str) -> Option<Route> {
        ROUTES
            .iter()
            .find(|(m, p, _)| *m == method && *p == path)
            .map(|(_, _, route)| *route)
    }
}

#[derive(Serialize)]
struct ResultEnvelope<'a> {
    result: &'a str,
}

#[derive(Serialize)]
struct DataEnvelope<'a> {
    data: &'a QueryResult,
}

/// Dispatches requests to the model and data adapters.
#[derive(Clone)]
pub struct RequestRouter {
    model: Arc<dyn ModelInvoker>,
    store: Arc<dyn TabularQuery>,
    data_query: Arc<str>,
}

impl RequestRouter {
    pub fn new(
        model: Arc<dyn ModelInvoker>,
        store: Arc<dyn TabularQuery>,
        data_query: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            model,
            store,
            data_query: data_query.into(),
        }
    }

    /// Handle one request. Never fails.
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        let span = tracing::info_span!(
            "request",
            method = %request.http_method,
            path = %request.path,
            request_id = request.request_id.as_deref().unwrap_or("-"),
        );

        async move {
            tracing::info!(
                "Received request: {} {}",
                request.http_method,
                request.path
            );

            let outcome = AssertUnwindSafe(self.dispatch(&request))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(AppError::InternalError(
                        anyhow!("{}", panic_message(panic.as_ref()))
                            .context("Request handler panicked"),
                    ))
                });

            let response = outcome.unwrap_or_else(OutboundResponse::from);
            tracing::info!(status = response.status_code, "Request completed");
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: &InboundRequest) -> Result<OutboundResponse, AppError> {
        match Route::resolve(&request.http_method, &request.path) {
            Some(Route::InvokeModel) => self.invoke_model(request).await,
            Some(Route::QueryData) => self.query_data(request).await,
            None => Err(AppError::NotFound(anyhow!(
                "{} {}",
                request.http_method,
                request.path
            ))),
        }
    }

    async fn invoke_model(&self, request: &InboundRequest) -> Result<OutboundResponse, AppError> {
        let PromptRequest { prompt } = parse_prompt(request.body.as_deref())?;

        let text = self
            .model
            .invoke(&prompt)
            .await
            .map_err(|e| AppError::DependencyFailed(INVOKE_FAILED, e.into()))?;

        Ok(OutboundResponse::json(
            StatusCode::OK,
            &ResultEnvelope { result: &text },
        )?)
    }

    async fn query_data(&self, request: &InboundRequest) -> Result<OutboundResponse, AppError> {
        // The statement is fixed; query-string values are never spliced into it.
        if !request.query_parameters.is_empty() {
            tracing::debug!(params = ?request.query_parameters, "Ignoring query parameters");
        }

        let rows = self
            .store
            .query(&self.data_query)
            .await
            .map_err(|e| AppError::DependencyFailed(QUERY_FAILED, e.into()))?;

        Ok(OutboundResponse::json(
            StatusCode::OK,
            &DataEnvelope { data: &rows },
        )?)
    }
}

fn parse_prompt(body: Option<&str>) -> Result<PromptRequest, AppError> {
    let body = body
        .filter(|b| !b.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow!("Request body is required")))?;

    let request: PromptRequest = serde_json::from_str(body)
        .map_err(|e| AppError::BadRequest(anyhow!("Invalid JSON body: {}", e)))?;
    request.validate()?;

    Ok(request)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
