use super::{Input, ModelOutput, decode_outputs};
use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Outputs of every model of a workflow for one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowResult {
    pub status: Status,
    pub input: Option<Input>,
    pub outputs: Vec<ModelOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowPredictResult {
    pub workflow: Option<Workflow>,
    pub results: Vec<WorkflowResult>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawResult {
    status: Status,
    input: Option<Input>,
    outputs: Vec<Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawWorkflowAnswer {
    workflow: Option<Workflow>,
    results: Vec<RawResult>,
}

impl WorkflowPredictResult {
    /// Reads a workflow answer. Each output is typed by the model echoed inside it.
    pub(crate) fn from_body(body: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawWorkflowAnswer::deserialize(body)?;

        Ok(Self {
            workflow: raw.workflow,
            results: raw
                .results
                .into_iter()
                .map(|r| WorkflowResult {
                    status: r.status,
                    input: r.input,
                    outputs: decode_outputs(&r.outputs, None),
                })
                .collect(),
        })
    }
}
