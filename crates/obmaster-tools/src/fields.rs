use crate::{ToolError, ToolId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One option of a single-select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FreeText,
    Select(&'static [Choice]),
    Count { min: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub hint: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Parses operator input for this field. Select fields accept the
    /// choice id or its exact label.
    pub fn parse_input(&self, tool: ToolId, raw: &str) -> Result<FieldValue, ToolError> {
        match self.kind {
            FieldKind::FreeText => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Select(_) => {
                let choice = self.choice(tool, raw)?;
                Ok(FieldValue::Text(choice.id.to_string()))
            }
            FieldKind::Count { .. } => self.count(tool, raw.trim()).map(FieldValue::Count),
        }
    }

    pub(crate) fn choice(&self, tool: ToolId, raw: &str) -> Result<Choice, ToolError> {
        let FieldKind::Select(choices) = self.kind else {
            return Err(self.invalid(tool, "field is not a selection"));
        };
        choices
            .iter()
            .find(|c| c.id == raw || c.label == raw)
            .copied()
            .ok_or_else(|| {
                let known = choices.iter().map(|c| c.id).collect::<Vec<_>>().join(", ");
                self.invalid(tool, format!("{raw:?} is not one of: {known}"))
            })
    }

    pub(crate) fn count(&self, tool: ToolId, raw: &str) -> Result<u64, ToolError> {
        let value = raw
            .parse::<u64>()
            .map_err(|_| self.invalid(tool, format!("{raw:?} is not a non-negative integer")))?;
        self.check_count(tool, value)
    }

    pub(crate) fn check_count(&self, tool: ToolId, value: u64) -> Result<u64, ToolError> {
        match self.kind {
            FieldKind::Count { min } if value < min => {
                Err(self.invalid(tool, format!("must be at least {min}")))
            }
            FieldKind::Count { .. } => Ok(value),
            _ => Err(self.invalid(tool, "field is not a count")),
        }
    }

    pub(crate) fn invalid(&self, tool: ToolId, reason: impl Into<String>) -> ToolError {
        ToolError::InvalidValue {
            tool,
            field: self.name.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Count(u64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Count(value)
    }
}

/// Form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<String, FieldValue>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: [Choice; 2] = [
        Choice {
            id: "dark",
            label: "Modo Escuro",
        },
        Choice {
            id: "neon",
            label: "Neon",
        },
    ];

    fn select() -> FieldSpec {
        FieldSpec {
            name: "color",
            label: "Cor:",
            hint: None,
            kind: FieldKind::Select(&COLORS),
        }
    }

    fn count() -> FieldSpec {
        FieldSpec {
            name: "clicks",
            label: "Cliques",
            hint: None,
            kind: FieldKind::Count { min: 0 },
        }
    }

    #[test]
    fn select_accepts_id_or_label() {
        let tool = ToolId::ContentGenerator;
        assert_eq!(
            select().parse_input(tool, "Modo Escuro").unwrap(),
            FieldValue::Text("dark".to_string())
        );
        assert_eq!(
            select().parse_input(tool, "neon").unwrap(),
            FieldValue::Text("neon".to_string())
        );
        let err = select().parse_input(tool, "NEON").unwrap_err();
        assert!(matches!(err, ToolError::InvalidValue { ref field, .. } if field == "color"));
    }

    #[test]
    fn count_rejects_negative_and_garbage() {
        let tool = ToolId::PerformanceAnalyzer;
        assert_eq!(
            count().parse_input(tool, " 42 ").unwrap(),
            FieldValue::Count(42)
        );
        assert!(count().parse_input(tool, "-1").is_err());
        assert!(count().parse_input(tool, "dez").is_err());
    }

    #[test]
    fn values_deserialize_from_plain_json() {
        let values: FieldValues =
            serde_json::from_value(serde_json::json!({"clicks": 3, "goal": "Leads"})).unwrap();
        assert_eq!(values.get("clicks"), Some(&FieldValue::Count(3)));
        assert_eq!(
            values.get("goal"),
            Some(&FieldValue::Text("Leads".to_string()))
        );
    }

    #[test]
    fn values_collect_from_pairs() {
        let values: FieldValues = [("goal", "Leads")].into_iter().collect();
        assert!(!values.is_empty());
        assert!(values.get("goal").is_some());
    }
}
