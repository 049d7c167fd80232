//! Core domain types and adapter traits for obmaster-rs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Persona directive sent with every generation call.
pub const SYSTEM_INSTRUCTION: &str = "\
Você é o \"OB Master Agent\", especialista em Marketing para Opções Binárias.
Seu tom é: Profissional, Trader de Elite, Persuasivo e focado em Conversão.
Sempre use formatação Markdown rica (negrito, listas, tabelas).
Não use introduções longas, vá direto ao ponto.
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_prompt: String,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// Outcome of one generation call. Failures are values, never faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum GenerationResult {
    Success(String),
    Failure(String),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The generated text or the failure message.
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterInfo {
    pub name: String,
    pub model: String,
    pub base_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("empty response: {0}")]
    EmptyResponse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn info(&self) -> AdapterInfo;

    /// Performs exactly one call to the backing service.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

pub fn validate_request(request: &GenerationRequest) -> Result<(), GenerationError> {
    if request.user_prompt.trim().is_empty() {
        return Err(GenerationError::Validation(
            "user prompt cannot be empty".to_string(),
        ));
    }
    if request.system_instruction.trim().is_empty() {
        return Err(GenerationError::Validation(
            "system instruction cannot be empty".to_string(),
        ));
    }
    Ok(())
}
