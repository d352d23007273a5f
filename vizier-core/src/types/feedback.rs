use super::{Concept, Crop};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackEvent {
    #[default]
    Annotation,
    SearchClick,
}

/// Identifies who gave the feedback and about which prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInfo {
    pub end_user_id: String,
    pub session_id: String,
    pub event_type: FeedbackEvent,
    pub output_id: String,
}

impl FeedbackInfo {
    pub fn new(
        end_user_id: impl Into<String>,
        session_id: impl Into<String>,
        output_id: impl Into<String>,
    ) -> Self {
        Self {
            end_user_id: end_user_id.into(),
            session_id: session_id.into(),
            event_type: FeedbackEvent::Annotation,
            output_id: output_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFeedbackKind {
    Accurate,
    Misplaced,
    NotDetected,
    FalsePositive,
}

/// Correction of one detected region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeedback {
    pub id: Option<String>,
    pub crop: Crop,
    pub concepts: Vec<Concept>,
    pub feedback: RegionFeedbackKind,
}

impl RegionFeedback {
    pub fn new(crop: Crop, feedback: RegionFeedbackKind) -> Self {
        Self {
            id: None,
            crop,
            concepts: Vec::new(),
            feedback,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_concepts(mut self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        self.concepts.extend(concepts);
        self
    }

    pub(crate) fn to_json(&self) -> Value {
        let mut region = json!({
            "region_info": { "bounding_box": self.crop, "feedback": self.feedback },
            "data": { "concepts": self.concepts },
        });
        if let (Some(id), Some(object)) = (&self.id, region.as_object_mut()) {
            object.insert("id".to_string(), json!(id));
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_feedback_wire_shape() {
        let region = RegionFeedback::new(Crop::new(0.125, 0.25, 0.5, 0.75), RegionFeedbackKind::Misplaced)
            .with_id("r1")
            .with_concepts([Concept::new("face").present()]);

        assert_eq!(
            region.to_json(),
            json!({
                "id": "r1",
                "region_info": {
                    "bounding_box": { "top_row": 0.125, "left_col": 0.25, "bottom_row": 0.5, "right_col": 0.75 },
                    "feedback": "misplaced"
                },
                "data": { "concepts": [{ "id": "face", "value": 1.0 }] }
            })
        );
    }

    #[test]
    fn feedback_info_defaults_to_annotation_events() {
        let info = FeedbackInfo::new("user", "session", "output");
        assert_eq!(
            serde_json::to_value(&info).unwrap()["event_type"],
            json!("annotation")
        );
    }
}
