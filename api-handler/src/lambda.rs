//! API Gateway proxy integration via `lambda_http`.

use crate::models::{InboundRequest, OutboundResponse};
use crate::router::RequestRouter;
use lambda_http::{service_fn, Body, Error, Request, RequestExt, Response};
use std::collections::HashMap;

/// Serve Lambda invocations until the runtime shuts down.
pub async fn run(router: RequestRouter) -> Result<(), Error> {
    tracing::info!("Starting Lambda runtime");

    lambda_http::run(service_fn(move |event: Request| {
        let router = router.clone();
        async move {
            let response = router.handle(inbound_from_lambda(&event)).await;
            into_lambda_response(response)
        }
    }))
    .await
}

pub fn inbound_from_lambda(req: &Request) -> InboundRequest {
    // The raw path is what the client called, without any stage prefix.
    let path = match req.raw_http_path() {
        "" => req.uri().path(),
        raw => raw,
    };

    let mut query_parameters = HashMap::new();
    if let Some(params) = req.query_string_parameters_ref() {
        for (key, value) in params.iter() {
            query_parameters
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    let body = match req.body() {
        Body::Empty => None,
        Body::Text(text) => Some(text.clone()),
        Body::Binary(bytes) => String::from_utf8(bytes.clone()).ok(),
    };

    InboundRequest {
        http_method: req.method().as_str().to_string(),
        path: path.to_string(),
        body,
        query_parameters,
        request_id: req.lambda_context_ref().map(|ctx| ctx.request_id.clone()),
    }
}

pub fn into_lambda_response(res: OutboundResponse) -> Result<Response<Body>, Error> {
    let mut builder = Response::builder().status(res.status_code);
    for (name, value) in &res.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    Ok(builder.body(Body::Text(res.body))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CORS_HEADERS;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn carries_method_path_and_body() {
        let req = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/api/bedrock")
            .body(Body::from(r#"{"prompt":"hi"}"#))
            .unwrap();

        let inbound = inbound_from_lambda(&req);
        assert_eq!(inbound.http_method, "POST");
        assert_eq!(inbound.path, "/api/bedrock");
        assert_eq!(inbound.body.as_deref(), Some(r#"{"prompt":"hi"}"#));
        assert!(inbound.query_parameters.is_empty());
    }

    #[test]
    fn empty_body_becomes_none() {
        let req = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/api/data")
            .body(Body::Empty)
            .unwrap();

        assert_eq!(inbound_from_lambda(&req).body, None);
    }

    #[test]
    fn carries_query_parameters() {
        let req = lambda_http::http::Request::builder()
            .method("GET")
            .uri("/api/data")
            .body(Body::Empty)
            .unwrap()
            .with_query_string_parameters(HashMap::from([(
                "limit".to_string(),
                "5".to_string(),
            )]));

        let inbound = inbound_from_lambda(&req);
        assert_eq!(inbound.query_parameters.get("limit").map(String::as_str), Some("5"));
    }

    #[test]
    fn response_keeps_status_headers_and_body() {
        let outbound = OutboundResponse::json(StatusCode::OK, &json!({"result": "hello"})).unwrap();
        let res = into_lambda_response(outbound).unwrap();

        assert_eq!(res.status(), 200);
        for (name, value) in CORS_HEADERS {
            assert_eq!(res.headers()[name], value);
        }
        match res.body() {
            Body::Text(text) => assert_eq!(text, r#"{"result":"hello"}"#),
            other => panic!("unexpected body: {:?}", other),
        }
    }
}
