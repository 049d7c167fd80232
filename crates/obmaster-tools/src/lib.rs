//! Tool registry: maps a marketing tool and its form inputs to a prompt.

mod fields;
mod registry;

pub use fields::{Choice, FieldKind, FieldSpec, FieldValue, FieldValues};
pub use registry::{dashboard_text, OutputStyle, ToolDefinition};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0:?}")]
    InvalidTool(String),
    #[error("tool {tool} requires field {field:?}")]
    MissingField { tool: ToolId, field: String },
    #[error("invalid value for {tool} field {field:?}: {reason}")]
    InvalidValue {
        tool: ToolId,
        field: String,
        reason: String,
    },
    #[error("tool {tool} field {field:?} cannot be blank")]
    BlankField { tool: ToolId, field: String },
    #[error("tool {0} has no prompt template")]
    NotGenerative(ToolId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    Dashboard,
    ContentGenerator,
    FunnelBuilder,
    PerformanceAnalyzer,
    CreativePromptGenerator,
    OfferGenerator,
}

impl ToolId {
    /// Every tool, in menu order.
    pub const ALL: [ToolId; 6] = [
        ToolId::Dashboard,
        ToolId::ContentGenerator,
        ToolId::FunnelBuilder,
        ToolId::PerformanceAnalyzer,
        ToolId::CreativePromptGenerator,
        ToolId::OfferGenerator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::Dashboard => "dashboard",
            ToolId::ContentGenerator => "content-generator",
            ToolId::FunnelBuilder => "funnel-builder",
            ToolId::PerformanceAnalyzer => "performance-analyzer",
            ToolId::CreativePromptGenerator => "creative-prompt-generator",
            ToolId::OfferGenerator => "offer-generator",
        }
    }

    pub fn definition(self) -> &'static ToolDefinition {
        registry::definition(self)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = ToolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ToolId::ALL
            .into_iter()
            .find(|id| id.as_str() == raw)
            .ok_or_else(|| ToolError::InvalidTool(raw.to_string()))
    }
}

/// Renders the prompt for `tool`. Pure: identical inputs give identical output.
pub fn render_prompt(tool: ToolId, values: &FieldValues) -> Result<String, ToolError> {
    tool.definition().render(values)
}

/// Same as [`render_prompt`], resolving the tool from its string identifier.
pub fn render_prompt_by_id(tool_id: &str, values: &FieldValues) -> Result<String, ToolError> {
    render_prompt(tool_id.parse()?, values)
}
