//! Application startup and lifecycle management.
//!
//! Wires the adapters into a [`RequestRouter`] and, outside Lambda, serves it
//! over a local `axum` listener so the handler can be exercised with curl.

use crate::config::{Backend, HandlerConfig};
use crate::models::{InboundRequest, OutboundResponse};
use crate::router::RequestRouter;
use crate::services::{
    BedrockModelInvoker, MockModelInvoker, MockTabularQuery, ModelInvoker, RdsDataQuery,
    TabularQuery,
};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::config::Region;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::{middleware, Router};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, resolve_request_id};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Build the router with the adapters selected by `config.backend`.
///
/// AWS clients are created once here and shared by every request.
pub async fn build_request_router(config: &HandlerConfig) -> RequestRouter {
    let (model, store): (Arc<dyn ModelInvoker>, Arc<dyn TabularQuery>) = match config.backend {
        Backend::Mock => {
            tracing::warn!("Using mock backends; no AWS calls will be made");
            (
                Arc::new(MockModelInvoker::new(true)),
                Arc::new(MockTabularQuery::new(true)),
            )
        }
        Backend::Aws => {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.aws.region.clone()))
                .load()
                .await;

            let model = BedrockModelInvoker::new(
                aws_sdk_bedrockruntime::Client::new(&sdk_config),
                config.model.model_id.clone(),
            );
            let store = RdsDataQuery::new(
                aws_sdk_rdsdata::Client::new(&sdk_config),
                config.database.cluster_arn.clone(),
                config.database.secret_arn.clone(),
                config.database.database.clone(),
            );

            tracing::info!(
                region = %config.aws.region,
                model_id = %config.model.model_id,
                "Initialized Bedrock and RDS Data clients"
            );

            (Arc::new(model), Arc::new(store))
        }
    };

    RequestRouter::new(model, store, config.database.data_query.clone())
}

/// Local HTTP server in front of a [`RequestRouter`].
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: RequestRouter,
}

impl Application {
    /// Bind the listener (port 0 = random port for testing).
    pub async fn build(config: &HandlerConfig, router: RequestRouter) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("API handler listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = Router::new()
            .fallback(forward)
            .with_state(self.router)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware));

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Every path goes to the router; it owns the 404 behaviour.
async fn forward(
    State(router): State<RequestRouter>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> OutboundResponse {
    let body = if body.is_empty() {
        None
    } else {
        String::from_utf8(body.to_vec()).ok()
    };

    let request = InboundRequest {
        http_method: method.as_str().to_string(),
        path: uri.path().to_string(),
        body,
        query_parameters: parse_query(query.as_deref()),
        request_id: Some(resolve_request_id(&headers)),
    };

    router.handle(request).await
}

/// First value wins for repeated keys.
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = query
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default();

    let mut params = HashMap::new();
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
