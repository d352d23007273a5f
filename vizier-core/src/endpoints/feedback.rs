use super::Endpoint;
use crate::{
    request::{ApiRequest, RequestError},
    types::{Concept, FeedbackInfo, RegionFeedback},
};
use http::Method;
use serde_json::{Map, Value, json};

/// Tells a model whether its predictions on an image were right.
///
/// Concept feedback uses the concept value (`1.0` correct, `0.0` wrong); detection models take
/// per-region corrections instead.
#[derive(Debug, Clone)]
pub struct ModelFeedback {
    pub model_id: String,
    pub version_id: Option<String>,
    pub input_id: Option<String>,
    pub image_url: String,
    pub concepts: Vec<Concept>,
    pub regions: Vec<RegionFeedback>,
    pub info: FeedbackInfo,
}

impl ModelFeedback {
    pub fn new(model_id: impl Into<String>, image_url: impl Into<String>, info: FeedbackInfo) -> Self {
        Self {
            model_id: model_id.into(),
            version_id: None,
            input_id: None,
            image_url: image_url.into(),
            concepts: Vec::new(),
            regions: Vec::new(),
            info,
        }
    }

    pub fn version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn input_id(mut self, input_id: impl Into<String>) -> Self {
        self.input_id = Some(input_id.into());
        self
    }

    pub fn concepts(mut self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        self.concepts.extend(concepts);
        self
    }

    pub fn regions(mut self, regions: impl IntoIterator<Item = RegionFeedback>) -> Self {
        self.regions.extend(regions);
        self
    }
}

impl Endpoint for ModelFeedback {
    type Output = ();

    fn request(&self) -> Result<ApiRequest, RequestError> {
        let mut data = Map::new();
        data.insert("image".to_string(), json!({ "url": self.image_url }));
        if !self.concepts.is_empty() {
            data.insert("concepts".to_string(), json!(self.concepts));
        }
        if !self.regions.is_empty() {
            let regions: Vec<Value> = self.regions.iter().map(RegionFeedback::to_json).collect();
            data.insert("regions".to_string(), Value::Array(regions));
        }

        let mut input = json!({ "data": data });
        if let Some(input_id) = &self.input_id {
            input["id"] = json!(input_id);
        }

        let request = match &self.version_id {
            Some(version_id) => ApiRequest::new(
                Method::POST,
                "/v2/models/{model_id}/versions/{version_id}/feedback",
                "PostModelFeedback",
            )
            .path_param("version_id", version_id),
            None => ApiRequest::new(
                Method::POST,
                "/v2/models/{model_id}/feedback",
                "PostModelFeedback",
            ),
        };

        Ok(request
            .path_param("model_id", &self.model_id)
            .body(json!({ "input": input, "feedback_info": self.info })))
    }

    fn decode(&self, _body: &Value) -> Result<(), serde_json::Error> {
        Ok(())
    }
}
