//! Pass-through proxy to the chat-completions upstream.
//!
//! Browser clients call `POST /api/groq` so the upstream key never leaves
//! the server. Errors use the flat `{error, details}` shape those clients
//! already expect, not the structured API error body.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::api::types::{header_key, ApiContext};

fn proxy_error(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    };
    (status, Json(body)).into_response()
}

/// `POST /api/groq` — forward the body upstream and relay the reply as-is.
pub async fn forward(State(ctx): State<ApiContext>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(key) = ctx.core.proxy_credential(header_key(&headers)) else {
        return proxy_error(StatusCode::BAD_REQUEST, "Missing GROQ_API_KEY on server", None);
    };

    let payload: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                return proxy_error(StatusCode::INTERNAL_SERVER_ERROR, "Proxy error", Some(e.to_string()))
            }
        }
    };

    let config = &ctx.core.config;
    let upstream = ctx
        .core
        .proxy_http()
        .post(&config.groq_url)
        .bearer_auth(key.as_str())
        .json(&payload);

    let exchange = async {
        let response = upstream.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok::<_, reqwest::Error>((status, text))
    };

    match tokio::time::timeout(config.llm_timeout, exchange).await {
        Ok(Ok((status, text))) => {
            tracing::debug!(status, bytes = text.len(), "Proxy relayed upstream reply");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, [(header::CONTENT_TYPE, "application/json")], text).into_response()
        }
        Ok(Err(e)) if e.is_timeout() => timed_out(config.llm_timeout),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Proxy upstream request failed");
            proxy_error(StatusCode::INTERNAL_SERVER_ERROR, "Proxy error", Some(e.to_string()))
        }
        Err(_) => timed_out(config.llm_timeout),
    }
}

fn timed_out(after: std::time::Duration) -> Response {
    tracing::warn!(after_secs = after.as_secs(), "Proxy upstream timed out");
    proxy_error(
        StatusCode::GATEWAY_TIMEOUT,
        &format!("Upstream timed out after {}s", after.as_secs().max(1)),
        None,
    )
}

/// Any method other than POST on the proxy route.
pub async fn method_not_allowed() -> Response {
    proxy_error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed", None)
}

#[cfg(test)]
mod tests {
    use crate::api::router::api_router;
    use crate::core_state::tests::{test_config, test_core};
    use crate::pipeline::gateway::MockGateway;
    use crate::testing::{spawn_router, unused_addr};
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderMap, Request, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn proxy_request(key: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/groq")
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header("x-groq-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Upstream stub that echoes the bearer token it saw.
    async fn echo_upstream() -> String {
        async fn reply(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            (
                StatusCode::OK,
                Json(json!({ "auth": auth, "model": body["model"] })),
            )
        }
        let addr = spawn_router(Router::new().route("/v1/chat", post(reply))).await;
        format!("http://{addr}/v1/chat")
    }

    #[tokio::test]
    async fn wrong_method_is_405_json() {
        let app = api_router(test_core(test_config(), MockGateway::new()));
        let req = Request::builder()
            .method("GET")
            .uri("/api/groq")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn missing_key_is_400() {
        let app = api_router(test_core(test_config(), MockGateway::new()));
        let response = app.oneshot(proxy_request(None, "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Missing GROQ_API_KEY on server");
    }

    #[tokio::test]
    async fn unprefixed_header_key_is_ignored() {
        let app = api_router(test_core(test_config(), MockGateway::new()));
        let response = app
            .oneshot(proxy_request(Some("sk-not-groq"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn forwards_with_header_key_and_relays_reply() {
        let mut config = test_config();
        config.groq_url = echo_upstream().await;
        config.environment_key = Some("env-key".into());
        let app = api_router(test_core(config, MockGateway::new()));

        let response = app
            .oneshot(proxy_request(Some("gsk_header"), r#"{"model":"m1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["auth"], "Bearer gsk_header");
        assert_eq!(json["model"], "m1");
    }

    #[tokio::test]
    async fn falls_back_to_environment_key() {
        let mut config = test_config();
        config.groq_url = echo_upstream().await;
        config.environment_key = Some("env-key".into());
        let app = api_router(test_core(config, MockGateway::new()));

        let response = app.oneshot(proxy_request(None, "{}")).await.unwrap();
        assert_eq!(body_json(response).await["auth"], "Bearer env-key");
    }

    #[tokio::test]
    async fn upstream_status_passes_through() {
        async fn limited() -> (StatusCode, &'static str) {
            (StatusCode::TOO_MANY_REQUESTS, r#"{"error":{"message":"slow down"}}"#)
        }
        let addr = spawn_router(Router::new().route("/v1/chat", post(limited))).await;
        let mut config = test_config();
        config.groq_url = format!("http://{addr}/v1/chat");
        let app = api_router(test_core(config, MockGateway::new()));

        let response = app
            .oneshot(proxy_request(Some("gsk_header"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(response).await["error"]["message"], "slow down");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_proxy_error() {
        let mut config = test_config();
        config.groq_url = format!("http://{}/v1/chat", unused_addr());
        let app = api_router(test_core(config, MockGateway::new()));

        let response = app
            .oneshot(proxy_request(Some("gsk_header"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Proxy error");
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn invalid_json_body_is_proxy_error() {
        let mut config = test_config();
        config.environment_key = Some("env-key".into());
        let app = api_router(test_core(config, MockGateway::new()));

        let response = app.oneshot(proxy_request(None, "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Proxy error");
    }

    #[tokio::test]
    async fn slow_upstream_is_504() {
        async fn slow() -> &'static str {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }
        let addr = spawn_router(Router::new().route("/v1/chat", post(slow))).await;
        let mut config = test_config();
        config.groq_url = format!("http://{addr}/v1/chat");
        config.llm_timeout = Duration::from_millis(200);
        let app = api_router(test_core(config, MockGateway::new()));

        let response = app
            .oneshot(proxy_request(Some("gsk_header"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Upstream timed out"));
    }
}
