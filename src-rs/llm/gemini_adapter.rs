use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::keys::KeyRing;
use super::types::{CompletionRequest, LLMResponse, Message, ProviderAdapter, ProviderError};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_ALLOWED_MODELS: [&str; 2] = ["gemini-3-flash-preview", "gemini-3-pro-preview"];

pub fn is_allowed_model(model: &str) -> bool {
    GEMINI_ALLOWED_MODELS.contains(&model)
}

pub struct GeminiConfig {
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct GeminiAdapter {
    cfg: GeminiConfig,
    keys: KeyRing,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(mut cfg: GeminiConfig) -> Result<Self, ProviderError> {
        if cfg.base_url.is_empty() {
            cfg.base_url = GEMINI_BASE_URL.to_string();
        }
        if cfg.model.is_empty() {
            cfg.model = DEFAULT_GEMINI_MODEL.to_string();
        }
        if cfg.temperature == 0.0 {
            cfg.temperature = 0.3;
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|err| ProviderError::new("client_error", &err.to_string(), false))?;
        Ok(Self {
            keys: KeyRing::new(cfg.api_keys.clone()),
            cfg,
            client,
        })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.cfg.model.clone());
        if !is_allowed_model(&model) {
            return Err(ProviderError::new(
                "invalid_model",
                &format!("model not allowed: {}", model),
                false,
            ));
        }
        let temperature = request.temperature.unwrap_or(self.cfg.temperature);
        let payload = build_payload(&request.messages, request.response_schema.as_ref(), temperature);

        let tries = self.keys.len();
        if tries == 0 {
            return Err(ProviderError::new("auth_error", "no Gemini API keys", false));
        }
        let mut last_err = None;
        for attempt in 0..tries {
            let key = match self.keys.next_key() {
                Some(key) => key,
                None => break,
            };
            match send_request(&self.client, &self.cfg.base_url, &model, key, &payload).await {
                Ok(resp) => return Ok(resp),
                Err(err) if err.retryable => {
                    warn!(attempt, code = %err.code, "gemini request failed, rotating key");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap_or_else(|| ProviderError::new("api_error", "request failed", true)))
    }
}

fn build_payload(messages: &[Message], response_schema: Option<&Value>, temperature: f64) -> Value {
    let mut contents = Vec::new();
    let mut system_instruction = None;

    for msg in messages {
        if msg.role == "system" {
            system_instruction = Some(msg.content.clone());
            continue;
        }
        let role = if msg.role == "user" { "user" } else { "model" };
        contents.push(json!({
            "role": role,
            "parts": [{"text": msg.content}]
        }));
    }

    let mut generation_config = json!({ "temperature": temperature });
    if let Some(schema) = response_schema {
        generation_config["responseMimeType"] = json!("application/json");
        generation_config["responseSchema"] = schema.clone();
    }

    let mut payload = json!({
        "contents": contents,
        "generationConfig": generation_config,
    });

    if let Some(system) = system_instruction {
        payload["systemInstruction"] = json!({
            "parts": [{"text": system}]
        });
    }

    payload
}

async fn send_request(
    client: &Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    payload: &Value,
) -> Result<LLMResponse, ProviderError> {
    let endpoint = format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );
    debug!(%endpoint, "sending gemini request");
    let resp = client
        .post(endpoint)
        .header("Content-Type", "application/json")
        .header("x-goog-api-key", api_key)
        .json(payload)
        .send()
        .await
        .map_err(|err| ProviderError::new("network_error", &err.to_string(), true))?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if status.is_client_error() || status.is_server_error() {
        let lowered = body.to_lowercase();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ProviderError::new("auth_error", &body, true));
        }
        if status.as_u16() == 429 || lowered.contains("quota") || lowered.contains("resource_exhausted") {
            return Err(ProviderError::new("rate_limit", &body, true));
        }
        if status.is_server_error() {
            return Err(ProviderError::new("server_error", &body, true));
        }
        return Err(ProviderError::new("api_error", &body, false));
    }

    let raw: Value = serde_json::from_str(&body)
        .map_err(|_| ProviderError::new("parse_error", "invalid json", false))?;
    Ok(LLMResponse {
        content: response_text(&raw),
        raw: Some(raw),
    })
}

fn response_text(raw: &Value) -> String {
    raw.get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .and_then(|first| first.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|v| v.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

    fn adapter(server: &MockServer, keys: &[&str]) -> GeminiAdapter {
        GeminiAdapter::new(GeminiConfig {
            api_keys: keys.iter().map(|k| k.to_string()).collect(),
            base_url: server.uri(),
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![Message::system("be brief"), Message::user("hello")],
            response_schema: Some(json!({"type": "ARRAY"})),
            ..CompletionRequest::default()
        }
    }

    fn text_body(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    #[test]
    fn payload_carries_system_instruction_and_schema() {
        let payload = build_payload(
            &[Message::system("sys"), Message::user("hi")],
            Some(&json!({"type": "ARRAY"})),
            0.2,
        );
        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(payload["contents"].as_array().unwrap().len(), 1);
        assert_eq!(payload["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(payload["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn allowlist_matches_exact_names() {
        assert!(is_allowed_model(DEFAULT_GEMINI_MODEL));
        assert!(is_allowed_model("gemini-3-pro-preview"));
        assert!(!is_allowed_model("gemini-3"));
        assert!(!is_allowed_model(""));
    }

    #[test]
    fn response_text_joins_parts() {
        let raw = json!({"candidates": [{"content": {"parts": [{"text": "[1,"}, {"text": "2]"}]}}]});
        assert_eq!(response_text(&raw), "[1,2]");
        assert_eq!(response_text(&json!({})), "");
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .and(header("x-goog-api-key", "key-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("[]")))
            .expect(1)
            .mount(&server)
            .await;

        let resp = adapter(&server, &["key-1"]).complete(request()).await.unwrap();
        assert_eq!(resp.content, "[]");
    }

    #[tokio::test]
    async fn rate_limited_key_rotates_to_next() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .and(header("x-goog-api-key", "key-1"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .and(header("x-goog-api-key", "key-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("ok")))
            .mount(&server)
            .await;

        let resp = adapter(&server, &["key-1", "key-2"]).complete(request()).await.unwrap();
        assert_eq!(resp.content, "ok");
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&server)
            .await;

        let err = adapter(&server, &["key-1", "key-2"]).complete(request()).await.unwrap_err();
        assert_eq!(err.code, "api_error");
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn missing_keys_fail_without_request() {
        let server = MockServer::start().await;
        let err = adapter(&server, &[]).complete(request()).await.unwrap_err();
        assert_eq!(err.code, "auth_error");
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let server = MockServer::start().await;
        let mut req = request();
        req.model = Some("gpt-unknown".to_string());
        let err = adapter(&server, &["key-1"]).complete(req).await.unwrap_err();
        assert_eq!(err.code, "invalid_model");
    }
}
