//! Model outputs and the polymorphic predictions inside them.
//!
//! The prediction shape is not self-describing: `data.concepts`, `data.colors`,
//! `data.regions`... must be read according to the model's type tag. The tag comes either from
//! the caller (who knows which kind of model they asked) or from the `model.output_info` echoed
//! back inside each output.
use super::{Concept, Crop, Input, Model, ModelType};
use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct W3cColor {
    pub hex: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Color {
    pub raw_hex: String,
    pub w3c: W3cColor,
    pub value: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub num_dimensions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceEmbedding {
    pub crop: Crop,
    pub embeddings: Vec<Embedding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub id: Option<String>,
    pub crop: Crop,
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceDetection {
    pub id: Option<String>,
    pub crop: Crop,
    pub value: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub crop: Crop,
    pub age_appearance: Vec<Concept>,
    pub gender_appearance: Vec<Concept>,
    pub multicultural_appearance: Vec<Concept>,
}

/// Focus of an image region. `crop` is `None` when the model only rated the whole image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Focus {
    pub crop: Option<Crop>,
    pub density: f32,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Logo {
    pub crop: Crop,
    pub concepts: Vec<Concept>,
}

/// Concepts found in one frame of a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: u32,
    /// Milliseconds from the start of the video.
    pub time: u32,
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    Concept(Concept),
    Color(Color),
    Embedding(Embedding),
    FaceEmbedding(FaceEmbedding),
    Detection(Detection),
    FaceDetection(FaceDetection),
    Demographics(Demographics),
    Focus(Focus),
    Logo(Logo),
    Frame(Frame),
}

/// The result of running one model on one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelOutput {
    pub id: String,
    pub status: Status,
    pub created_at: Option<DateTime<Utc>>,
    pub model: Option<Model>,
    pub input: Option<Input>,
    pub predictions: Vec<Prediction>,
}

impl ModelOutput {
    /// The concept predictions of this output, ignoring any other prediction kind.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.predictions.iter().filter_map(|p| match p {
            Prediction::Concept(c) => Some(c),
            _ => None,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFocus {
    density: f32,
    value: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFaceAppearance {
    concepts: Vec<Concept>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFace {
    age_appearance: RawFaceAppearance,
    gender_appearance: RawFaceAppearance,
    multicultural_appearance: RawFaceAppearance,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRegionInfo {
    bounding_box: Crop,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRegionData {
    concepts: Vec<Concept>,
    embeddings: Vec<Embedding>,
    face: RawFace,
    focus: Option<RawFocus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRegion {
    id: Option<String>,
    region_info: RawRegionInfo,
    data: RawRegionData,
    value: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrameInfo {
    index: u32,
    time: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrameData {
    concepts: Vec<Concept>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrame {
    frame_info: RawFrameInfo,
    data: RawFrameData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawData {
    concepts: Vec<Concept>,
    colors: Vec<Color>,
    embeddings: Vec<Embedding>,
    regions: Vec<RawRegion>,
    frames: Vec<RawFrame>,
    focus: Option<RawFocus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOutput {
    id: String,
    status: Status,
    created_at: Option<DateTime<Utc>>,
    model: Option<Model>,
    input: Option<Input>,
    data: RawData,
}

fn predictions(model_type: ModelType, data: RawData) -> Vec<Prediction> {
    let regions = data.regions.into_iter();

    match model_type {
        ModelType::Concept => data.concepts.into_iter().map(Prediction::Concept).collect(),
        ModelType::Color => data.colors.into_iter().map(Prediction::Color).collect(),
        ModelType::Embedding => data
            .embeddings
            .into_iter()
            .map(Prediction::Embedding)
            .collect(),
        ModelType::FaceEmbedding => regions
            .map(|r| {
                Prediction::FaceEmbedding(FaceEmbedding {
                    crop: r.region_info.bounding_box,
                    embeddings: r.data.embeddings,
                })
            })
            .collect(),
        ModelType::Detection => regions
            .map(|r| {
                Prediction::Detection(Detection {
                    id: r.id,
                    crop: r.region_info.bounding_box,
                    concepts: r.data.concepts,
                })
            })
            .collect(),
        ModelType::FaceDetection => regions
            .map(|r| {
                Prediction::FaceDetection(FaceDetection {
                    id: r.id,
                    crop: r.region_info.bounding_box,
                    value: r.value,
                })
            })
            .collect(),
        ModelType::Demographics => regions
            .map(|r| {
                let face = r.data.face;
                Prediction::Demographics(Demographics {
                    crop: r.region_info.bounding_box,
                    age_appearance: face.age_appearance.concepts,
                    gender_appearance: face.gender_appearance.concepts,
                    multicultural_appearance: face.multicultural_appearance.concepts,
                })
            })
            .collect(),
        ModelType::Focus => {
            let overall = data.focus.as_ref().map_or(0.0, |f| f.value);
            let mut focus: Vec<_> = regions
                .map(|r| {
                    Prediction::Focus(Focus {
                        crop: Some(r.region_info.bounding_box),
                        density: r.data.focus.map_or(0.0, |f| f.density),
                        value: overall,
                    })
                })
                .collect();

            if focus.is_empty()
                && let Some(f) = data.focus
            {
                focus.push(Prediction::Focus(Focus {
                    crop: None,
                    density: f.density,
                    value: f.value,
                }));
            }
            focus
        }
        ModelType::Logo => regions
            .map(|r| {
                Prediction::Logo(Logo {
                    crop: r.region_info.bounding_box,
                    concepts: r.data.concepts,
                })
            })
            .collect(),
        ModelType::Video => data
            .frames
            .into_iter()
            .map(|f| {
                Prediction::Frame(Frame {
                    index: f.frame_info.index,
                    time: f.frame_info.time,
                    concepts: f.data.concepts,
                })
            })
            .collect(),
    }
}

/// Decodes the `outputs` array of a prediction answer.
///
/// `declared` is the model type the caller asked for; outputs without it fall back to the tag
/// echoed in their own `model`, and then to concept predictions. Outputs that are malformed or
/// carry a tag this client does not know are skipped with a warning; their siblings are kept.
pub(crate) fn decode_outputs(outputs: &[Value], declared: Option<ModelType>) -> Vec<ModelOutput> {
    outputs
        .iter()
        .enumerate()
        .filter_map(|(index, value)| decode_output(index, value, declared))
        .collect()
}

fn decode_output(index: usize, value: &Value, declared: Option<ModelType>) -> Option<ModelOutput> {
    let raw: RawOutput = match RawOutput::deserialize(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(index, error = %e, "skipping malformed model output");
            return None;
        }
    };

    let model_type = match (declared, raw.model.as_ref()) {
        (Some(model_type), _) => model_type,
        (None, Some(model)) => match (model.model_type(), model.tag()) {
            (Some(model_type), _) => model_type,
            (None, Some(tag)) => {
                warn!(index, tag, "skipping output of unknown model type");
                return None;
            }
            (None, None) => ModelType::Concept,
        },
        (None, None) => {
            debug!(index, "output has no model type, reading concepts");
            ModelType::Concept
        }
    };

    Some(ModelOutput {
        id: raw.id,
        status: raw.status,
        created_at: raw.created_at,
        model: raw.model,
        input: raw.input,
        predictions: predictions(model_type, raw.data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output_with(tag: &str, data: Value) -> Value {
        json!({
            "id": "out-1",
            "status": { "code": 10000, "description": "Ok" },
            "model": { "id": "m", "output_info": { "type": tag, "type_ext": tag } },
            "input": { "id": "in-1" },
            "data": data
        })
    }

    #[test]
    fn reads_concepts_for_concept_models() {
        let outputs = decode_outputs(
            &[output_with(
                "concept",
                json!({ "concepts": [{ "id": "ai_1", "name": "train", "value": 0.99 }] }),
            )],
            None,
        );

        assert_eq!(outputs.len(), 1);
        let concepts: Vec<_> = outputs[0].concepts().collect();
        assert_eq!(concepts[0].name.as_deref(), Some("train"));
        assert_eq!(outputs[0].input.as_ref().unwrap().id.as_deref(), Some("in-1"));
    }

    #[test]
    fn reads_regions_for_detection_models() {
        let data = json!({
            "regions": [{
                "id": "r1",
                "region_info": { "bounding_box": { "top_row": 0.1, "left_col": 0.2, "bottom_row": 0.3, "right_col": 0.4 } },
                "data": { "concepts": [{ "id": "logo-1", "name": "Shell", "value": 0.8 }] }
            }]
        });

        let outputs = decode_outputs(&[output_with("detect-concept", data.clone())], None);
        let Prediction::Detection(detection) = &outputs[0].predictions[0] else {
            panic!("expected a detection, got {:?}", outputs[0].predictions);
        };
        assert_eq!(detection.id.as_deref(), Some("r1"));
        assert_eq!(detection.crop, Crop::new(0.1, 0.2, 0.3, 0.4));

        let outputs = decode_outputs(&[output_with("logo", data)], None);
        assert!(matches!(outputs[0].predictions[0], Prediction::Logo(_)));
    }

    #[test]
    fn reads_demographics_faces() {
        let data = json!({
            "regions": [{
                "region_info": { "bounding_box": { "top_row": 0.1, "left_col": 0.1, "bottom_row": 0.5, "right_col": 0.5 } },
                "data": { "face": {
                    "age_appearance": { "concepts": [{ "id": "ai_25", "name": "25", "value": 0.4 }] },
                    "gender_appearance": { "concepts": [{ "id": "ai_f", "name": "feminine", "value": 0.6 }] },
                    "multicultural_appearance": { "concepts": [] }
                } }
            }]
        });

        let outputs = decode_outputs(&[output_with("facedetect-demographics", data)], None);
        let Prediction::Demographics(face) = &outputs[0].predictions[0] else {
            panic!("expected demographics");
        };
        assert_eq!(face.age_appearance[0].name.as_deref(), Some("25"));
        assert_eq!(face.gender_appearance.len(), 1);
        assert!(face.multicultural_appearance.is_empty());
    }

    #[test]
    fn reads_frames_for_video_models() {
        let data = json!({
            "frames": [
                { "frame_info": { "index": 0, "time": 0 }, "data": { "concepts": [{ "id": "a" }] } },
                { "frame_info": { "index": 1, "time": 1000 }, "data": { "concepts": [] } }
            ]
        });

        let outputs = decode_outputs(&[output_with("video", data)], None);
        assert_eq!(outputs[0].predictions.len(), 2);
        let Prediction::Frame(frame) = &outputs[0].predictions[1] else {
            panic!("expected a frame");
        };
        assert_eq!((frame.index, frame.time), (1, 1000));
    }

    #[test]
    fn whole_image_focus_without_regions() {
        let outputs = decode_outputs(
            &[output_with("focus", json!({ "focus": { "density": 0.3, "value": 0.9 } }))],
            None,
        );
        assert_eq!(
            outputs[0].predictions,
            vec![Prediction::Focus(Focus {
                crop: None,
                density: 0.3,
                value: 0.9
            })]
        );
    }

    #[test]
    fn focus_regions_carry_their_density_and_the_overall_value() {
        let data = json!({
            "focus": { "density": 0.25, "value": 0.75 },
            "regions": [
                {
                    "region_info": { "bounding_box": { "top_row": 0.0, "left_col": 0.0, "bottom_row": 0.5, "right_col": 0.5 } },
                    "data": { "focus": { "density": 0.5, "value": 0.0 } }
                },
                {
                    "region_info": { "bounding_box": { "top_row": 0.5, "left_col": 0.5, "bottom_row": 1.0, "right_col": 1.0 } },
                    "data": { "focus": { "density": 0.125 } }
                }
            ]
        });

        let outputs = decode_outputs(&[output_with("focus", data)], None);
        assert_eq!(
            outputs[0].predictions,
            vec![
                Prediction::Focus(Focus {
                    crop: Some(Crop::new(0.0, 0.0, 0.5, 0.5)),
                    density: 0.5,
                    value: 0.75
                }),
                Prediction::Focus(Focus {
                    crop: Some(Crop::new(0.5, 0.5, 1.0, 1.0)),
                    density: 0.125,
                    value: 0.75
                }),
            ]
        );
    }

    #[test]
    fn reads_face_embeddings_per_region() {
        let data = json!({
            "regions": [{
                "region_info": { "bounding_box": { "top_row": 0.25, "left_col": 0.25, "bottom_row": 0.75, "right_col": 0.75 } },
                "data": { "embeddings": [{ "vector": [0.5, -0.25, 1.0], "num_dimensions": 3 }] }
            }]
        });

        let outputs = decode_outputs(&[output_with("facedetect-embed", data)], None);
        assert_eq!(
            outputs[0].predictions,
            vec![Prediction::FaceEmbedding(FaceEmbedding {
                crop: Crop::new(0.25, 0.25, 0.75, 0.75),
                embeddings: vec![Embedding {
                    vector: vec![0.5, -0.25, 1.0],
                    num_dimensions: 3
                }],
            })]
        );
    }

    #[test]
    fn declared_type_overrides_echoed_tag() {
        let outputs = decode_outputs(
            &[output_with(
                "concept",
                json!({ "colors": [{ "raw_hex": "#f2f2f2", "w3c": { "hex": "#f5f5f5", "name": "WhiteSmoke" }, "value": 0.9 }] }),
            )],
            Some(ModelType::Color),
        );
        let Prediction::Color(color) = &outputs[0].predictions[0] else {
            panic!("expected a color");
        };
        assert_eq!(color.w3c.name, "WhiteSmoke");
    }

    #[test]
    fn unknown_and_malformed_outputs_are_skipped() {
        let outputs = decode_outputs(
            &[
                output_with("cluster", json!({})),
                json!({ "id": 42, "data": "nope" }),
                output_with("embed", json!({ "embeddings": [{ "vector": [0.1, 0.2], "num_dimensions": 2 }] })),
            ],
            None,
        );

        assert_eq!(outputs.len(), 1);
        assert!(matches!(outputs[0].predictions[0], Prediction::Embedding(_)));
    }
}
