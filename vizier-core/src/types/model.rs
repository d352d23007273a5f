use super::Concept;
use crate::status::{Status, codes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The family a model belongs to, which decides the shape of its predictions.
///
/// Identified on the wire by the `output_info.type_ext` (or `type`) tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    Concept,
    Color,
    Embedding,
    FaceEmbedding,
    Detection,
    FaceDetection,
    Demographics,
    Focus,
    Logo,
    Video,
}

impl ModelType {
    pub const ALL: [ModelType; 10] = [
        ModelType::Concept,
        ModelType::Color,
        ModelType::Embedding,
        ModelType::FaceEmbedding,
        ModelType::Detection,
        ModelType::FaceDetection,
        ModelType::Demographics,
        ModelType::Focus,
        ModelType::Logo,
        ModelType::Video,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ModelType::Concept => "concept",
            ModelType::Color => "color",
            ModelType::Embedding => "embed",
            ModelType::FaceEmbedding => "facedetect-embed",
            ModelType::Detection => "detect-concept",
            ModelType::FaceDetection => "facedetect",
            ModelType::Demographics => "facedetect-demographics",
            ModelType::Focus => "focus",
            ModelType::Logo => "logo",
            ModelType::Video => "video",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(ModelType::tag).collect();
            format!("unknown model type '{s}', expected one of: {}", known.join(", "))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub concepts_mutually_exclusive: bool,
    pub closed_environment: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ConceptData {
    concepts: Vec<Concept>,
}

/// Describes what a model outputs: its type tag, configuration and known concepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_config: Option<OutputConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ConceptData>,
}

impl OutputInfo {
    /// Concepts the model was trained on, when the server returned them.
    pub fn concepts(&self) -> &[Concept] {
        self.data.as_ref().map_or(&[], |d| d.concepts.as_slice())
    }

    /// The raw type tag, preferring the extended one.
    pub fn tag(&self) -> Option<&str> {
        self.type_ext
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.type_name.as_deref().filter(|t| !t.is_empty()))
    }

    pub fn model_type(&self) -> Option<ModelType> {
        [self.type_ext.as_deref(), self.type_name.as_deref()]
            .into_iter()
            .flatten()
            .find_map(ModelType::from_tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStatus {
    Trained,
    Training,
    Untrained,
    Pending,
    Failed(u32),
    Other(u32),
}

impl From<u32> for TrainingStatus {
    fn from(code: u32) -> Self {
        match code {
            codes::MODEL_TRAINED => TrainingStatus::Trained,
            codes::MODEL_TRAINING => TrainingStatus::Training,
            codes::MODEL_UNTRAINED => TrainingStatus::Untrained,
            codes::MODEL_QUEUED_FOR_TRAINING => TrainingStatus::Pending,
            codes::MODEL_TRAINING_NO_DATA..=codes::MODEL_TRAINING_UNKNOWN_ERROR => {
                TrainingStatus::Failed(code)
            }
            other => TrainingStatus::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStatus {
    Evaluated,
    Evaluating,
    NotEvaluated,
    Pending,
    Failed(u32),
    Other(u32),
}

impl From<u32> for EvaluationStatus {
    fn from(code: u32) -> Self {
        match code {
            codes::MODEL_EVALUATED => EvaluationStatus::Evaluated,
            codes::MODEL_EVALUATING => EvaluationStatus::Evaluating,
            codes::MODEL_NOT_EVALUATED => EvaluationStatus::NotEvaluated,
            codes::MODEL_QUEUED_FOR_EVALUATION => EvaluationStatus::Pending,
            codes::MODEL_EVALUATION_TIMED_OUT..=codes::MODEL_EVALUATION_UNKNOWN_ERROR => {
                EvaluationStatus::Failed(code)
            }
            other => EvaluationStatus::Other(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct EvalMetrics {
    status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelVersion {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_input_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<EvalMetrics>,
}

impl ModelVersion {
    pub fn training_status(&self) -> Option<TrainingStatus> {
        self.status.as_ref().map(|s| TrainingStatus::from(s.code))
    }

    pub fn evaluation_status(&self) -> Option<EvaluationStatus> {
        self.metrics
            .as_ref()
            .map(|m| EvaluationStatus::from(m.status.code))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_info: Option<OutputInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<ModelVersion>,
}

impl Model {
    pub fn model_type(&self) -> Option<ModelType> {
        self.output_info.as_ref().and_then(OutputInfo::model_type)
    }

    pub fn tag(&self) -> Option<&str> {
        self.output_info.as_ref().and_then(OutputInfo::tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_tag_round_trips_through_from_tag() {
        for model_type in ModelType::ALL {
            assert_eq!(ModelType::from_tag(model_type.tag()), Some(model_type));
        }
        assert_eq!(ModelType::from_tag("cluster"), None);
        assert!("cluster".parse::<ModelType>().is_err());
        assert_eq!("detect-concept".parse(), Ok(ModelType::Detection));
    }

    #[test]
    fn parses_a_model_with_version_state() {
        let model: Model = serde_json::from_value(json!({
            "id": "aaa03c23b3724a16a56b629203edc62c",
            "name": "general-v1.3",
            "app_id": "main",
            "created_at": "2016-03-09T17:11:39.608845Z",
            "output_info": {
                "message": "Show output_info with: GET /models/{model_id}/output_info",
                "type": "concept",
                "type_ext": "concept",
                "output_config": { "concepts_mutually_exclusive": false, "closed_environment": true },
                "data": { "concepts": [{ "id": "ai_1", "name": "cat" }] }
            },
            "model_version": {
                "id": "aa9ca48295b37401f8af92ad1af0d91d",
                "status": { "code": 21100, "description": "Model trained successfully" },
                "metrics": { "status": { "code": 21302 } }
            }
        }))
        .unwrap();

        assert_eq!(model.model_type(), Some(ModelType::Concept));
        let info = model.output_info.as_ref().unwrap();
        assert_eq!(info.concepts().len(), 1);
        assert!(info.output_config.as_ref().unwrap().closed_environment);

        let version = model.model_version.as_ref().unwrap();
        assert_eq!(version.training_status(), Some(TrainingStatus::Trained));
        assert_eq!(
            version.evaluation_status(),
            Some(EvaluationStatus::NotEvaluated)
        );
    }

    #[test]
    fn extended_tag_wins_over_base_type() {
        let info = OutputInfo {
            type_name: Some("concept".to_string()),
            type_ext: Some("facedetect-demographics".to_string()),
            ..Default::default()
        };
        assert_eq!(info.model_type(), Some(ModelType::Demographics));
        assert_eq!(info.tag(), Some("facedetect-demographics"));
    }

    #[test]
    fn training_failures_are_grouped() {
        assert_eq!(
            TrainingStatus::from(codes::MODEL_TRAINING_NO_DATA),
            TrainingStatus::Failed(codes::MODEL_TRAINING_NO_DATA)
        );
        assert_eq!(TrainingStatus::from(99), TrainingStatus::Other(99));
    }
}
