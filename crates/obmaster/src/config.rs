use obmaster_core::SYSTEM_INSTRUCTION;
use std::env;
use std::fmt;
use std::io;
use url::Url;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const DOTENV_FILE: &str = ".env";

const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),
    #[error("invalid {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
    #[error("failed to build generation adapter: {0}")]
    Adapter(String),
}

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    model: String,
    base_url: Option<Url>,
    system_instruction: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(API_KEY_VAR));
        }
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        })
    }

    /// Reads the process environment, falling back to a `.env` file in the
    /// working directory. Variables already set are never overridden. A
    /// missing `.env` is fine; an unreadable or malformed one is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup(API_KEY_VAR).unwrap_or_default())?;

        if let Some(model) = non_blank(lookup(MODEL_VAR)) {
            config.model = model;
        }
        if let Some(raw) = non_blank(lookup(BASE_URL_VAR)) {
            let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                var: BASE_URL_VAR,
                reason: e.to_string(),
            })?;
            config.base_url = Some(url);
        }
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }
}

fn check_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::InvalidValue {
            var: DOTENV_FILE,
            reason: e.to_string(),
        }),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
