use super::{Endpoint, field};
use crate::{
    request::{ApiRequest, RequestError},
    types::{Concept, Input, ModelOutput, ModelType, decode_outputs},
};
use http::Method;
use serde::Serialize;
use serde_json::{Value, json};

/// Tuning of concept predictions, sent as `output_config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictOptions {
    /// Only return concepts with at least this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concepts: Option<u32>,
    /// Restrict predictions to these concepts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub select_concepts: Vec<Concept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PredictOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Runs a model on one or more inputs.
///
/// `model_type` tells the client how to read the predictions. When unset, each output is read
/// according to the model information echoed back by the server.
#[derive(Debug, Clone, Default)]
pub struct Predict {
    pub model_id: String,
    pub version_id: Option<String>,
    pub model_type: Option<ModelType>,
    pub inputs: Vec<Input>,
    pub options: PredictOptions,
}

impl Predict {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    pub fn version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = Some(model_type);
        self
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = Input>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn min_value(mut self, min_value: f32) -> Self {
        self.options.min_value = Some(min_value);
        self
    }

    pub fn max_concepts(mut self, max_concepts: u32) -> Self {
        self.options.max_concepts = Some(max_concepts);
        self
    }

    pub fn select_concepts(mut self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        self.options.select_concepts.extend(concepts);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.options.language = Some(language.into());
        self
    }
}

impl Endpoint for Predict {
    type Output = Vec<ModelOutput>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        let request = match &self.version_id {
            Some(version_id) => ApiRequest::new(
                Method::POST,
                "/v2/models/{model_id}/versions/{version_id}/outputs",
                "PostModelOutputs",
            )
            .path_param("version_id", version_id),
            None => ApiRequest::new(
                Method::POST,
                "/v2/models/{model_id}/outputs",
                "PostModelOutputs",
            ),
        };

        let mut body = json!({ "inputs": self.inputs });
        if !self.options.is_empty() {
            body["model"] = json!({ "output_info": { "output_config": self.options } });
        }

        Ok(request.path_param("model_id", &self.model_id).body(body))
    }

    fn decode(&self, body: &Value) -> Result<Vec<ModelOutput>, serde_json::Error> {
        let outputs: Vec<Value> = field(body, "outputs")?;
        Ok(decode_outputs(&outputs, self.model_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prediction;

    #[test]
    fn plain_predict_body() {
        let request = Predict::new("general")
            .input(Input::image_url("https://samples.example.com/metro-north.jpg"))
            .request()
            .unwrap();

        assert_eq!(request.path().unwrap(), "/v2/models/general/outputs");
        assert_eq!(
            request.body,
            Some(json!({ "inputs": [
                { "data": { "image": { "url": "https://samples.example.com/metro-north.jpg" } } }
            ] }))
        );
    }

    #[test]
    fn options_go_under_output_config() {
        let request = Predict::new("general")
            .version("v1")
            .input(Input::image_url("https://x"))
            .min_value(0.5)
            .max_concepts(3)
            .select_concepts([Concept::new("dog")])
            .language("zh")
            .request()
            .unwrap();

        assert_eq!(request.path().unwrap(), "/v2/models/general/versions/v1/outputs");
        assert_eq!(
            request.body.unwrap()["model"],
            json!({ "output_info": { "output_config": {
                "min_value": 0.5,
                "max_concepts": 3,
                "select_concepts": [{ "id": "dog" }],
                "language": "zh"
            } } })
        );
    }

    #[test]
    fn declared_model_type_drives_decoding() {
        let outputs = Predict::new("face")
            .model_type(ModelType::FaceDetection)
            .decode(&json!({
                "status": { "code": 10000 },
                "outputs": [{
                    "id": "o1",
                    "status": { "code": 10000 },
                    "data": { "regions": [{
                        "region_info": { "bounding_box": { "top_row": 0.5, "left_col": 0.25, "bottom_row": 0.75, "right_col": 0.5 } },
                        "value": 0.99
                    }] }
                }]
            }))
            .unwrap();

        let Prediction::FaceDetection(face) = &outputs[0].predictions[0] else {
            panic!("expected a face detection, got {:?}", outputs[0].predictions);
        };
        assert_eq!(face.value, Some(0.99));
    }

    #[test]
    fn non_array_outputs_are_a_shape_error() {
        assert!(Predict::new("general").decode(&json!({ "outputs": "oops" })).is_err());
    }
}
