use api_handler::config::HandlerConfig;
use api_handler::lambda;
use api_handler::startup::{build_request_router, Application};
use service_core::observability::init_tracing;

const SERVICE_NAME: &str = "api-handler";

/// Set by the Lambda execution environment.
const LAMBDA_RUNTIME_API_VAR: &str = "AWS_LAMBDA_RUNTIME_API";

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    let config = match HandlerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(SERVICE_NAME, "info", None);
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    init_tracing(
        SERVICE_NAME,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    let router = build_request_router(&config).await;

    if std::env::var_os(LAMBDA_RUNTIME_API_VAR).is_some() {
        return lambda::run(router).await;
    }

    let app = Application::build(&config, router).await?;
    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("HTTP server error: {}", e);
        e
    })?;

    Ok(())
}
