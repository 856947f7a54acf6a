use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::{ApiKey, ChatMessage, ChatRequest, GatewayError, LlmGateway};
use crate::config::AppConfig;

/// Longest upstream error text carried into a `GatewayError`.
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Where a chat completion can be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// A proxy exposing `POST {base}/api/groq`; the key travels in `x-groq-key`.
    Proxy { base: String },
    /// The provider's chat-completions URL; the key travels as a bearer token.
    Direct { url: String },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Proxy { base } => write!(f, "proxy {base}"),
            Endpoint::Direct { url } => write!(f, "direct {url}"),
        }
    }
}

/// Wire body for an OpenAI-compatible chat-completions call.
#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> From<&'a ChatRequest> for CompletionBody<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: &request.messages,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

/// HTTP gateway to a Groq-compatible chat-completions service.
///
/// Candidates are tried in order. Only a failure to connect moves on to the
/// next one; once a candidate answers, its answer (success or error) is final.
/// The whole call, across all candidates, is bounded by `timeout`.
pub struct GroqGateway {
    http: reqwest::Client,
    endpoints: Vec<Endpoint>,
    timeout: Duration,
}

impl GroqGateway {
    pub fn new(endpoints: Vec<Endpoint>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| GatewayError::NetworkUnreachable(format!("HTTP client init: {e}")))?;
        Ok(Self {
            http,
            endpoints,
            timeout,
        })
    }

    /// Proxy base (when configured) first, then the direct upstream URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let mut endpoints = Vec::new();
        if let Some(base) = &config.api_base {
            endpoints.push(Endpoint::Proxy { base: base.clone() });
        }
        endpoints.push(Endpoint::Direct {
            url: config.groq_url.clone(),
        });
        Self::new(endpoints, config.llm_timeout)
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    async fn try_endpoints(
        &self,
        request: &ChatRequest,
        credential: Option<&ApiKey>,
    ) -> Result<String, GatewayError> {
        let body = CompletionBody::from(request);
        let mut connect_failures = Vec::new();

        for endpoint in &self.endpoints {
            let builder = match endpoint {
                Endpoint::Proxy { base } => {
                    let builder = self.http.post(format!("{base}/api/groq"));
                    match credential {
                        Some(key) => builder.header("x-groq-key", key.as_str()),
                        None => builder,
                    }
                }
                Endpoint::Direct { url } => {
                    let Some(key) = credential else {
                        return Err(GatewayError::Unauthorized(
                            "no API key available for the direct endpoint".into(),
                        ));
                    };
                    self.http.post(url).bearer_auth(key.as_str())
                }
            };

            match builder.json(&body).send().await {
                Ok(response) => return self.read_response(endpoint, response).await,
                Err(e) if e.is_connect() => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "LLM endpoint unreachable");
                    connect_failures.push(format!("{endpoint}: {e}"));
                }
                Err(e) if e.is_timeout() => {
                    return Err(GatewayError::Timeout {
                        after: self.timeout,
                    })
                }
                Err(e) => {
                    return Err(GatewayError::NetworkUnreachable(format!("{endpoint}: {e}")));
                }
            }
        }

        if connect_failures.is_empty() {
            Err(GatewayError::NetworkUnreachable(
                "no LLM endpoint configured".into(),
            ))
        } else {
            Err(GatewayError::NetworkUnreachable(connect_failures.join("; ")))
        }
    }

    async fn read_response(
        &self,
        endpoint: &Endpoint,
        response: reqwest::Response,
    ) -> Result<String, GatewayError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    after: self.timeout,
                }
            } else {
                GatewayError::UpstreamError {
                    status: status.as_u16(),
                    message: format!("failed to read response body: {e}"),
                }
            }
        })?;

        if !status.is_success() {
            let message = normalize_error_body(status.as_u16(), &text);
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                message = %message,
                "LLM upstream returned an error"
            );
            return Err(classify_status(status, message, self.timeout));
        }

        let completion: Value =
            serde_json::from_str(&text).map_err(|e| GatewayError::UpstreamError {
                status: status.as_u16(),
                message: format!("completion is not JSON: {e}"),
            })?;

        completion
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::UpstreamError {
                status: status.as_u16(),
                message: "completion has no choices[0].message.content".into(),
            })
    }
}

#[async_trait]
impl LlmGateway for GroqGateway {
    async fn invoke(
        &self,
        request: &ChatRequest,
        credential: Option<&ApiKey>,
    ) -> Result<String, GatewayError> {
        let started = std::time::Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.try_endpoints(request, credential)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout {
                after: self.timeout,
            }),
        };

        match &result {
            Ok(content) => tracing::info!(
                model = %request.model,
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = content.len(),
                "LLM call completed"
            ),
            Err(e) => tracing::warn!(
                model = %request.model,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "LLM call failed"
            ),
        }
        result
    }
}

/// Map a non-2xx status onto the gateway taxonomy.
///
/// A 504 here is normally the proxy relaying its own upstream timeout, so it
/// is reported as `Timeout` rather than `UpstreamError`.
pub fn classify_status(status: StatusCode, message: String, timeout: Duration) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::Timeout { after: timeout }
        }
        other => GatewayError::UpstreamError {
            status: other.as_u16(),
            message,
        },
    }
}

/// Reduce the many upstream error body shapes to one message.
///
/// Handles `{error: {message}}`, `{error: "...", details}`, `{message}`,
/// plain text and an empty body.
pub fn normalize_error_body(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));
    }

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(trimmed) {
        let from_error = match obj.get("error") {
            Some(Value::Object(err)) => err.get("message").and_then(Value::as_str).map(str::to_string),
            Some(Value::String(err)) => Some(match obj.get("details").and_then(Value::as_str) {
                Some(details) if !details.is_empty() => format!("{err}: {details}"),
                _ => err.clone(),
            }),
            _ => None,
        };
        if let Some(message) = from_error.or_else(|| {
            obj.get("message").and_then(Value::as_str).map(str::to_string)
        }) {
            return clip(&message);
        }
    }

    clip(trimmed)
}

fn clip(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        message.to_string()
    } else {
        let cut: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        format!("{cut}…")
    }
}
