use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A label, optionally associated with an input through a value.
///
/// A `value` of exactly `0.0` marks a negative association ("this input is *not* a dog").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Concept {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Marks the concept as present (`1.0`).
    pub fn present(self) -> Self {
        self.with_value(1.0)
    }

    /// Marks the concept as absent (`0.0`).
    pub fn absent(self) -> Self {
        self.with_value(0.0)
    }

    pub fn is_negative(&self) -> bool {
        self.value == Some(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_only_concept_omits_name_and_value() {
        let json = serde_json::to_value(Concept::new("ferrari23")).unwrap();
        assert_eq!(json, json!({ "id": "ferrari23" }));
    }

    #[test]
    fn zero_value_is_written_and_means_negative() {
        let concept = Concept::new("dog").absent();
        assert!(concept.is_negative());
        assert_eq!(
            serde_json::to_value(&concept).unwrap(),
            json!({ "id": "dog", "value": 0.0 })
        );
        assert!(!Concept::new("dog").is_negative());
    }

    #[test]
    fn parses_server_concepts() {
        let concept: Concept = serde_json::from_value(json!({
            "id": "ai_HLmqFqBf",
            "name": "train",
            "value": 0.5,
            "app_id": "main",
            "created_at": "2016-03-17T11:43:01.223962Z"
        }))
        .unwrap();

        assert_eq!(concept.id, "ai_HLmqFqBf");
        assert_eq!(concept.name.as_deref(), Some("train"));
        assert_eq!(concept.value, Some(0.5));
        assert_eq!(concept.app_id.as_deref(), Some("main"));
        assert!(concept.created_at.is_some());
    }
}
