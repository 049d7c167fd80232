//! High-level obmaster SDK: render a tool prompt, run one generation call.

mod config;

pub use config::{Config, ConfigError, API_KEY_VAR, BASE_URL_VAR, DOTENV_FILE, MODEL_VAR};

use obmaster_core::{
    validate_request, GenerationError, GenerationRequest, GenerationResult, TextGenerator,
};
use obmaster_tools::{FieldValues, ToolError, ToolId};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Operator-facing prefix of every failure message.
pub const FAILURE_PREFIX: &str = "Erro ao conectar com a IA: ";

pub struct Client {
    config: Arc<Config>,
    generator: Arc<dyn TextGenerator>,
}

impl Client {
    pub fn new(config: Arc<Config>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { config, generator }
    }

    /// Builds a client backed by the Gemini adapter described by `config`.
    #[cfg(feature = "gemini")]
    pub fn from_config(config: Arc<Config>) -> Result<Self, ConfigError> {
        use obmaster_adapter_gemini::GeminiAdapter;

        let adapter = match config.base_url() {
            Some(base_url) => {
                GeminiAdapter::with_base_url(config.api_key(), config.model(), base_url.clone())
            }
            None => GeminiAdapter::new(config.api_key(), config.model()),
        }
        .map_err(|e| ConfigError::Adapter(e.to_string()))?;
        Ok(Self::new(config, Arc::new(adapter)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wraps `user_prompt` with the process-wide system instruction.
    pub fn request(&self, user_prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest::new(self.config.system_instruction(), user_prompt)
    }

    /// Runs exactly one generation call. Never retries and never fails:
    /// every error comes back as [`GenerationResult::Failure`].
    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let id = Uuid::new_v4();
        let adapter = self.generator.info();
        debug!(%id, adapter = %adapter.name, model = %adapter.model, "generation started");

        if let Err(error) = validate_request(&request) {
            warn!(%id, %error, "generation request rejected");
            return failure(&error);
        }

        let started = Instant::now();
        match self.generator.generate_text(&request).await {
            Ok(text) => {
                info!(
                    %id,
                    elapsed = ?started.elapsed(),
                    output_chars = text.chars().count(),
                    "generation succeeded"
                );
                GenerationResult::Success(text)
            }
            Err(error) => {
                warn!(
                    %id,
                    elapsed = ?started.elapsed(),
                    %error,
                    "generation failed"
                );
                failure(&error)
            }
        }
    }

    /// Checks the form, renders the tool's prompt and generates from it.
    /// Form problems are returned before any network call is made.
    pub async fn generate_for(
        &self,
        tool: ToolId,
        values: &FieldValues,
    ) -> Result<GenerationResult, ToolError> {
        let definition = tool.definition();
        definition.check_ready(values)?;
        let prompt = definition.render(values)?;
        debug!(%tool, prompt_chars = prompt.chars().count(), "rendered tool prompt");
        Ok(self.generate(self.request(prompt)).await)
    }
}

fn failure(error: &GenerationError) -> GenerationResult {
    GenerationResult::Failure(format!("{FAILURE_PREFIX}{error}"))
}

pub use obmaster_core;
pub use obmaster_tools;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use obmaster_core::AdapterInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Reply(String),
        Fail(fn() -> GenerationError),
    }

    struct MockGenerator {
        behavior: Behavior,
        calls: AtomicUsize,
        last_request: Mutex<Option<GenerationRequest>>,
    }

    impl MockGenerator {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        fn info(&self) -> AdapterInfo {
            AdapterInfo {
                name: "mock".to_string(),
                model: "mock-model".to_string(),
                base_url: None,
            }
        }

        async fn generate_text(
            &self,
            request: &GenerationRequest,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.behavior {
                Behavior::Reply(text) => Ok(text.clone()),
                Behavior::Fail(make) => Err(make()),
            }
        }
    }

    fn client(generator: Arc<MockGenerator>) -> Client {
        Client::new(Arc::new(Config::new("test-key").unwrap()), generator)
    }

    #[tokio::test]
    async fn success_text_is_returned_unmodified() {
        let raw = "  **Headline**\r\n\tCTA  \n".to_string();
        let generator = MockGenerator::new(Behavior::Reply(raw.clone()));
        let client = client(generator.clone());

        let result = client.generate(client.request("Crie um funil")).await;

        assert_eq!(result, GenerationResult::Success(raw));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_becomes_failure_value() {
        let generator = MockGenerator::new(Behavior::Fail(|| {
            GenerationError::Transport("connection reset".to_string())
        }));
        let client = client(generator.clone());

        let result = client.generate(client.request("Crie um funil")).await;

        match result {
            GenerationResult::Failure(message) => {
                assert!(message.starts_with(FAILURE_PREFIX));
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn every_error_kind_is_contained() {
        let makers: [fn() -> GenerationError; 4] = [
            || GenerationError::Authentication("bad key".to_string()),
            || GenerationError::RateLimited("quota".to_string()),
            || GenerationError::Provider("500".to_string()),
            || GenerationError::EmptyResponse("blocked".to_string()),
        ];
        for make in makers {
            let generator = MockGenerator::new(Behavior::Fail(make));
            let client = client(generator.clone());
            let result = client.generate(client.request("prompt")).await;
            assert!(!result.is_success());
            assert!(!result.text().is_empty());
            assert_eq!(generator.calls(), 1, "no retries");
        }
    }

    #[tokio::test]
    async fn empty_prompt_fails_without_calling_the_service() {
        let generator = MockGenerator::new(Behavior::Reply("unused".to_string()));
        let client = client(generator.clone());

        let result = client.generate(client.request("")).await;

        assert!(matches!(result, GenerationResult::Failure(ref m) if m.contains("empty")));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn every_request_carries_the_same_system_instruction() {
        let generator = MockGenerator::new(Behavior::Reply("ok".to_string()));
        let client = client(generator.clone());

        let values = FieldValues::new().with("product", "Mentoria VIP");
        client
            .generate_for(ToolId::OfferGenerator, &values)
            .await
            .unwrap();
        let first = generator.last_request.lock().unwrap().clone().unwrap();

        let values = FieldValues::new().with("goal", "Cadastro na Corretora");
        client
            .generate_for(ToolId::FunnelBuilder, &values)
            .await
            .unwrap();
        let second = generator.last_request.lock().unwrap().clone().unwrap();

        assert_eq!(first.system_instruction, second.system_instruction);
        assert_eq!(first.system_instruction, obmaster_core::SYSTEM_INSTRUCTION);
        assert!(first.user_prompt.contains("Mentoria VIP"));
        assert!(second.user_prompt.contains("Cadastro na Corretora"));
    }

    #[tokio::test]
    async fn blank_form_is_rejected_before_generation() {
        let generator = MockGenerator::new(Behavior::Reply("ok".to_string()));
        let client = client(generator.clone());

        let values = FieldValues::new().with("scene", " ");
        let err = client
            .generate_for(ToolId::CreativePromptGenerator, &values)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::BlankField { .. }));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn dashboard_never_generates() {
        let generator = MockGenerator::new(Behavior::Reply("ok".to_string()));
        let client = client(generator.clone());

        let err = client
            .generate_for(ToolId::Dashboard, &FieldValues::new())
            .await
            .unwrap_err();

        assert_eq!(err, ToolError::NotGenerative(ToolId::Dashboard));
        assert_eq!(generator.calls(), 0);
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn gemini_client_uses_configured_model() {
        let config = Config::from_lookup(|name| match name {
            API_KEY_VAR => Some("test-key".to_string()),
            MODEL_VAR => Some("gemini-1.5-pro".to_string()),
            _ => None,
        })
        .unwrap();
        let client = Client::from_config(Arc::new(config)).unwrap();
        assert_eq!(client.generator.info().model, "gemini-1.5-pro");
        assert_eq!(client.generator.info().name, "gemini");
    }
}
