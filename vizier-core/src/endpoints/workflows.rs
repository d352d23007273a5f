use super::{Endpoint, PredictOptions};
use crate::{
    request::{ApiRequest, RequestError},
    types::{Input, WorkflowPredictResult},
};
use http::Method;
use serde_json::{Value, json};

/// Runs every model of a workflow on the given inputs in one call.
#[derive(Debug, Clone, Default)]
pub struct WorkflowPredict {
    pub workflow_id: String,
    pub inputs: Vec<Input>,
    pub options: PredictOptions,
}

impl WorkflowPredict {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            ..Default::default()
        }
    }

    pub fn input(mut self, input: Input) -> Self {
        self.inputs.push(input);
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
}

impl Endpoint for WorkflowPredict {
    type Output = WorkflowPredictResult;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        let mut body = json!({ "inputs": self.inputs });
        if !self.options.is_empty() {
            body["output_config"] = json!(self.options);
        }

        Ok(ApiRequest::new(
            Method::POST,
            "/v2/workflows/{workflow_id}/results",
            "PostWorkflowResults",
        )
        .path_param("workflow_id", &self.workflow_id)
        .body(body))
    }

    fn decode(&self, body: &Value) -> Result<WorkflowPredictResult, serde_json::Error> {
        WorkflowPredictResult::from_body(body)
    }
}
