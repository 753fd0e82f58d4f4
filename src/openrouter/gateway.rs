use crate::{
    config::OpenRouterConfig,
    error::{GenerationError, Result},
    models::{ChatCompletionRequest, RequestOrigin},
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REFERER: &str = "http://localhost:3000";
pub const DEFAULT_TITLE: &str = "Nano Banana";

/// Values for OpenRouter's `HTTP-Referer` / `X-Title` attribution headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub referer: String,
    pub title: String,
}

impl Attribution {
    /// Referer priority: configured override, request Origin, request Referer, default.
    pub fn resolve(config: &OpenRouterConfig, origin: &RequestOrigin) -> Self {
        let referer = config
            .referer_override
            .clone()
            .or_else(|| origin.origin.clone())
            .or_else(|| origin.referer.clone())
            .unwrap_or_else(|| DEFAULT_REFERER.to_string());
        let title = config
            .title_override
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Self { referer, title }
    }
}

/// One synchronous chat-completion round trip. Returns the decoded body, or
/// `None` when a successful response was not valid JSON.
#[async_trait]
pub trait UpstreamGateway: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        attribution: &Attribution,
        payload: &ChatCompletionRequest,
    ) -> Result<Option<Value>>;
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_headers(&self, api_key: &str, attribution: &Attribution) -> Result<header::HeaderMap> {
        let value = |raw: &str, name: &str| {
            header::HeaderValue::from_str(raw).map_err(|e| {
                GenerationError::ConfigError(format!("Invalid {} header value: {}", name, e))
            })
        };

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            value(&format!("Bearer {}", api_key), "Authorization")?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        );
        headers.insert(
            header::HeaderName::from_static("http-referer"),
            value(&attribution.referer, "HTTP-Referer")?,
        );
        headers.insert(
            header::HeaderName::from_static("x-title"),
            value(&attribution.title, "X-Title")?,
        );
        Ok(headers)
    }
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamGateway for HttpGateway {
    async fn complete(
        &self,
        api_key: &str,
        attribution: &Attribution,
        payload: &ChatCompletionRequest,
    ) -> Result<Option<Value>> {
        let url = format!("{}/chat/completions", self.base_url);
        log::debug!("POST {} (model: {})", url, payload.model);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers(api_key, attribution)?)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("OpenRouter request failed: {}", e);
                GenerationError::UpstreamError {
                    status: None,
                    message: format!("OpenRouter request failed: {}", e),
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.ok();
        let decoded = body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice::<Value>(bytes).ok());

        if !status.is_success() {
            let message = upstream_error_message(decoded.as_ref(), status.as_u16());
            log::error!("OpenRouter returned {}: {}", status, message);
            return Err(GenerationError::UpstreamError {
                status: Some(status.as_u16()),
                message,
            });
        }

        if decoded.is_none() {
            log::warn!("OpenRouter returned {} with a non-JSON body", status);
        }
        Ok(decoded)
    }
}

/// Picks the first meaningful value among `error.message`, `error` and `message`.
/// A non-string pick collapses to a generic message.
pub fn upstream_error_message(payload: Option<&Value>, status: u16) -> String {
    let candidate = payload.and_then(|p| {
        [&p["error"]["message"], &p["error"], &p["message"]]
            .into_iter()
            .find(|v| is_truthy(v))
    });

    match candidate {
        Some(Value::String(message)) => message.clone(),
        Some(_) => "OpenRouter error".to_string(),
        None => format!("OpenRouter error ({})", status),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    pub enum Reply {
        Body(Option<Value>),
        Failure { status: Option<u16>, message: String },
    }

    /// Records every call and answers with a canned reply.
    pub struct RecordingGateway {
        reply: Reply,
        calls: AtomicUsize,
        last: Mutex<Option<(String, Attribution, ChatCompletionRequest)>>,
    }

    impl RecordingGateway {
        pub fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        pub fn returning(body: Value) -> Self {
            Self::new(Reply::Body(Some(body)))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_call(&self) -> Option<(String, Attribution, ChatCompletionRequest)> {
            self.last.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamGateway for RecordingGateway {
        async fn complete(
            &self,
            api_key: &str,
            attribution: &Attribution,
            payload: &ChatCompletionRequest,
        ) -> Result<Option<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() =
                Some((api_key.to_string(), attribution.clone(), payload.clone()));
            match &self.reply {
                Reply::Body(body) => Ok(body.clone()),
                Reply::Failure { status, message } => Err(GenerationError::UpstreamError {
                    status: *status,
                    message: message.clone(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, ChatRole, MessageContent};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "google/gemini-2.5-flash-image".into(),
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: MessageContent::Text("hi".into()),
            }],
            modalities: vec!["image".into(), "text".into()],
            stream: false,
        }
    }

    fn attribution() -> Attribution {
        Attribution {
            referer: "https://app.example.com".into(),
            title: "Nano Banana".into(),
        }
    }

    #[test]
    fn test_attribution_priority() {
        let origin = RequestOrigin {
            origin: Some("https://origin.example".into()),
            referer: Some("https://referer.example/page".into()),
        };

        let configured = OpenRouterConfig::new()
            .with_referer("https://configured.example")
            .with_title("Studio");
        let resolved = Attribution::resolve(&configured, &origin);
        assert_eq!(resolved.referer, "https://configured.example");
        assert_eq!(resolved.title, "Studio");

        let plain = OpenRouterConfig::new();
        assert_eq!(Attribution::resolve(&plain, &origin).referer, "https://origin.example");

        let referer_only = RequestOrigin {
            origin: None,
            referer: Some("https://referer.example/page".into()),
        };
        assert_eq!(
            Attribution::resolve(&plain, &referer_only).referer,
            "https://referer.example/page"
        );

        let fallback = Attribution::resolve(&plain, &RequestOrigin::default());
        assert_eq!(fallback.referer, DEFAULT_REFERER);
        assert_eq!(fallback.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_error_message_shapes() {
        let nested = json!({ "error": { "message": "rate limited" } });
        assert_eq!(upstream_error_message(Some(&nested), 429), "rate limited");

        let flat = json!({ "error": "bad key" });
        assert_eq!(upstream_error_message(Some(&flat), 401), "bad key");

        let top = json!({ "message": "overloaded" });
        assert_eq!(upstream_error_message(Some(&top), 503), "overloaded");

        let object_error = json!({ "error": { "code": 500 } });
        assert_eq!(upstream_error_message(Some(&object_error), 500), "OpenRouter error");

        let empty_message = json!({ "error": { "message": "" }, "message": "fallback" });
        assert_eq!(upstream_error_message(Some(&empty_message), 500), "OpenRouter error");

        assert_eq!(upstream_error_message(None, 502), "OpenRouter error (502)");
        assert_eq!(upstream_error_message(Some(&json!({})), 500), "OpenRouter error (500)");
    }

    #[tokio::test]
    async fn test_sends_headers_and_returns_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .and(header("HTTP-Referer", "https://app.example.com"))
            .and(header("X-Title", "Nano Banana"))
            .and(header("Cache-Control", "no-store"))
            .and(body_partial_json(json!({ "stream": false, "modalities": ["image", "text"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "images": [] } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway = HttpGateway::new().with_base_url(format!("{}/", mock_server.uri()));
        let body = gateway
            .complete("test-key-123", &attribution(), &payload())
            .await
            .unwrap();
        assert_eq!(body, Some(json!({ "choices": [{ "message": { "images": [] } }] })));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_upstream_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({ "error": { "message": "rate limited" } })),
            )
            .mount(&mock_server)
            .await;

        let gateway = HttpGateway::new().with_base_url(mock_server.uri());
        let err = gateway
            .complete("k", &attribution(), &payload())
            .await
            .unwrap_err();
        match err {
            GenerationError::UpstreamError { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_bodies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer down"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let gateway = HttpGateway::new().with_base_url(mock_server.uri());

        let ok = gateway.complete("ok", &attribution(), &payload()).await.unwrap();
        assert!(ok.is_none());

        let err = gateway
            .complete("down", &attribution(), &payload())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenRouter error (503)");
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let gateway = HttpGateway::new().with_base_url("http://127.0.0.1:1");
        let err = gateway
            .complete("k", &attribution(), &payload())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UpstreamError { status: None, .. }));
    }
}
