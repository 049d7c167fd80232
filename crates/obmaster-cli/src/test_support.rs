use async_trait::async_trait;
use obmaster::obmaster_core::{AdapterInfo, GenerationError, GenerationRequest, TextGenerator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Generator double that records prompts and either answers or fails.
#[derive(Default)]
pub struct Recorder {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl TextGenerator for Recorder {
    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "recorder".to_string(),
            model: "none".to_string(),
            base_url: None,
        }
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push(request.user_prompt.clone());
        if self.fail {
            Err(GenerationError::Transport("offline".to_string()))
        } else {
            Ok("**Resposta**".to_string())
        }
    }
}
