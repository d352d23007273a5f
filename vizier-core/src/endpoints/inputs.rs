use super::{Endpoint, PatchAction, field};
use crate::{
    request::{ApiRequest, Pagination, RequestError},
    types::{Concept, Input, InputCount},
};
use http::Method;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Default)]
pub struct AddInputs {
    pub inputs: Vec<Input>,
}

impl AddInputs {
    pub fn new(inputs: impl IntoIterator<Item = Input>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }
}

impl Endpoint for AddInputs {
    type Output = Vec<Input>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::POST, "/v2/inputs", "PostInputs")
            .body(json!({ "inputs": self.inputs })))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Input>, serde_json::Error> {
        field(body, "inputs")
    }
}

#[derive(Debug, Clone)]
pub struct GetInput {
    pub input_id: String,
}

impl GetInput {
    pub fn new(input_id: impl Into<String>) -> Self {
        Self {
            input_id: input_id.into(),
        }
    }
}

impl Endpoint for GetInput {
    type Output = Input;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::GET, "/v2/inputs/{input_id}", "GetInput")
            .path_param("input_id", &self.input_id))
    }

    fn decode(&self, body: &Value) -> Result<Input, serde_json::Error> {
        field(body, "input")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListInputs {
    pub pagination: Option<Pagination>,
}

impl ListInputs {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            pagination: Some(Pagination::new(page, per_page)),
        }
    }
}

impl Endpoint for ListInputs {
    type Output = Vec<Input>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::GET, "/v2/inputs", "ListInputs").pagination(self.pagination))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Input>, serde_json::Error> {
        field(body, "inputs")
    }
}

/// Updates the concepts or metadata of stored inputs.
///
/// Each input only needs its `id` and the values to merge or remove.
#[derive(Debug, Clone, Default)]
pub struct PatchInputs {
    pub action: PatchAction,
    pub inputs: Vec<Input>,
}

impl PatchInputs {
    pub fn new(action: PatchAction, inputs: impl IntoIterator<Item = Input>) -> Self {
        Self {
            action,
            inputs: inputs.into_iter().collect(),
        }
    }

    pub fn merge_concepts(input_id: impl Into<String>, concepts: impl IntoIterator<Item = Concept>) -> Self {
        Self::new(
            PatchAction::Merge,
            [Input::existing(input_id).with_concepts(concepts)],
        )
    }

    pub fn remove_concepts(input_id: impl Into<String>, concepts: impl IntoIterator<Item = Concept>) -> Self {
        Self::new(
            PatchAction::Remove,
            [Input::existing(input_id).with_concepts(concepts)],
        )
    }

    pub fn merge_metadata(input_id: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self::new(
            PatchAction::Merge,
            [Input::existing(input_id).with_metadata(metadata)],
        )
    }
}

impl Endpoint for PatchInputs {
    type Output = Vec<Input>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::PATCH, "/v2/inputs", "PatchInputs")
            .body(json!({ "action": self.action, "inputs": self.inputs })))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Input>, serde_json::Error> {
        field(body, "inputs")
    }
}

#[derive(Debug, Clone)]
pub struct DeleteInput {
    pub input_id: String,
}

impl DeleteInput {
    pub fn new(input_id: impl Into<String>) -> Self {
        Self {
            input_id: input_id.into(),
        }
    }
}

impl Endpoint for DeleteInput {
    type Output = ();

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::DELETE, "/v2/inputs/{input_id}", "DeleteInput")
            .path_param("input_id", &self.input_id))
    }

    fn decode(&self, _body: &Value) -> Result<(), serde_json::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteInputs {
    Ids(Vec<String>),
    /// Deletes every input of the application.
    All,
}

impl Endpoint for DeleteInputs {
    type Output = ();

    fn request(&self) -> Result<ApiRequest, RequestError> {
        let body = match self {
            DeleteInputs::Ids(ids) => json!({ "ids": ids }),
            DeleteInputs::All => json!({ "delete_all": true }),
        };
        Ok(ApiRequest::new(Method::DELETE, "/v2/inputs", "DeleteInputs").body(body))
    }

    fn decode(&self, _body: &Value) -> Result<(), serde_json::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetInputCount;

impl Endpoint for GetInputCount {
    type Output = InputCount;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(
            Method::GET,
            "/v2/inputs/status",
            "GetInputCount",
        ))
    }

    fn decode(&self, body: &Value) -> Result<InputCount, serde_json::Error> {
        field(body, "counts")
    }
}
