use async_trait::async_trait;
use obmaster_core::{AdapterInfo, GenerationError, GenerationRequest, TextGenerator};
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone)]
pub struct GeminiAdapter {
    api_key: String,
    pub base_url: Url,
    pub api_version: String,
    pub model: String,
    client: HttpClient,
}

impl fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiAdapter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerationError> {
        let base_url =
            Url::parse(DEFAULT_BASE_URL).map_err(|e| GenerationError::Internal(e.to_string()))?;
        Self::with_base_url(api_key, model, base_url)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Url,
    ) -> Result<Self, GenerationError> {
        // No request timeout: the transport default applies.
        let client = HttpClient::builder().build().map_err(|e| {
            GenerationError::Internal(format!("failed to build http client: {e}"))
        })?;
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            api_version: "v1beta".to_string(),
            model: model.into(),
            client,
        })
    }

    fn endpoint_url(&self) -> Result<Url, GenerationError> {
        let mut url = self
            .base_url
            .join(&format!(
                "{}/models/{}:generateContent",
                self.api_version,
                self.model.trim()
            ))
            .map_err(|e| {
                GenerationError::Internal(format!("failed to construct endpoint url: {e}"))
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl TextGenerator for GeminiAdapter {
    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "gemini".to_string(),
            model: self.model.clone(),
            base_url: Some(self.base_url.clone()),
        }
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let url = self.endpoint_url()?;
        debug!(
            model = %self.model,
            prompt_chars = request.user_prompt.chars().count(),
            "sending generateContent request"
        );
        let response = self
            .client
            .post(url)
            .json(&build_generate_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("request failed: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(parse_http_error(status, text));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| GenerationError::Provider(format!("invalid json response: {e}")))?;
        parse_generate_response(&payload)
    }
}

fn build_generate_body(request: &GenerationRequest) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.user_prompt }]
        }]
    })
}

fn parse_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = extract_provider_error(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerationError::Authentication(message)
        }
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        _ => GenerationError::Provider(format!("{status}: {message}")),
    }
}

fn extract_provider_error(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or(body)
}

fn parse_generate_response(payload: &Value) -> Result<String, GenerationError> {
    match extract_text_from_payload(payload) {
        Some(text) => Ok(text),
        None => Err(GenerationError::EmptyResponse(empty_reason(payload))),
    }
}

/// Concatenates every candidate text part; `None` when there is none at all.
fn extract_text_from_payload(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|candidate| {
            candidate
                .get("content")
                .and_then(|c| c.get("parts"))
                .and_then(Value::as_array)
        })
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>();
    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

fn empty_reason(payload: &Value) -> String {
    if let Some(reason) = payload
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(Value::as_str)
    {
        return format!("prompt blocked ({reason})");
    }
    payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str)
        .map(|reason| format!("no text returned (finish reason {reason})"))
        .unwrap_or_else(|| "no text returned".to_string())
}
