use super::{Endpoint, field};
use crate::{
    request::{ApiRequest, Pagination, RequestError},
    types::Model,
};
use http::Method;
use serde_json::Value;

/// Fetches a model, or one specific version of it.
#[derive(Debug, Clone)]
pub struct GetModel {
    pub model_id: String,
    pub version_id: Option<String>,
}

impl GetModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            version_id: None,
        }
    }

    pub fn version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl Endpoint for GetModel {
    type Output = Model;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(match &self.version_id {
            Some(version_id) => ApiRequest::new(
                Method::GET,
                "/v2/models/{model_id}/versions/{version_id}",
                "GetModel",
            )
            .path_param("model_id", &self.model_id)
            .path_param("version_id", version_id),
            None => ApiRequest::new(Method::GET, "/v2/models/{model_id}", "GetModel")
                .path_param("model_id", &self.model_id),
        })
    }

    fn decode(&self, body: &Value) -> Result<Model, serde_json::Error> {
        field(body, "model")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListModels {
    pub pagination: Option<Pagination>,
}

impl ListModels {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            pagination: Some(Pagination::new(page, per_page)),
        }
    }
}

impl Endpoint for ListModels {
    type Output = Vec<Model>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::GET, "/v2/models", "ListModels").pagination(self.pagination))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Model>, serde_json::Error> {
        field(body, "models")
    }
}

/// Fetches a model together with its output info (type tag, configuration and concepts).
#[derive(Debug, Clone)]
pub struct GetModelOutputInfo {
    pub model_id: String,
}

impl GetModelOutputInfo {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

impl Endpoint for GetModelOutputInfo {
    type Output = Model;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(
            Method::GET,
            "/v2/models/{model_id}/output_info",
            "GetModelOutputInfo",
        )
        .path_param("model_id", &self.model_id))
    }

    fn decode(&self, body: &Value) -> Result<Model, serde_json::Error> {
        field(body, "model")
    }
}

/// Starts training a new version of a custom model.
///
/// Training is asynchronous: the answer holds the model with its new version in the
/// queued or training state.
#[derive(Debug, Clone)]
pub struct TrainModel {
    pub model_id: String,
}

impl TrainModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

impl Endpoint for TrainModel {
    type Output = Model;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(
            Method::POST,
            "/v2/models/{model_id}/versions",
            "PostModelVersions",
        )
        .path_param("model_id", &self.model_id))
    }

    fn decode(&self, body: &Value) -> Result<Model, serde_json::Error> {
        field(body, "model")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrainingStatus;
    use serde_json::json;

    #[test]
    fn get_model_with_and_without_version() {
        assert_eq!(
            GetModel::new("general").request().unwrap().path().unwrap(),
            "/v2/models/general"
        );

        let request = GetModel::new("general").version("v1").request().unwrap();
        assert_eq!(request.path().unwrap(), "/v2/models/general/versions/v1");
        assert_eq!(
            request.rpc_body().unwrap(),
            json!({ "model_id": "general", "version_id": "v1" })
        );
    }

    #[test]
    fn train_model_reads_the_queued_version() {
        let endpoint = TrainModel::new("pets");
        let request = endpoint.request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path().unwrap(), "/v2/models/pets/versions");
        assert!(request.body.is_none());

        let model = endpoint
            .decode(&json!({
                "status": { "code": 10000 },
                "model": {
                    "id": "pets",
                    "model_version": { "id": "v2", "status": { "code": 21103 } }
                }
            }))
            .unwrap();
        assert_eq!(
            model.model_version.unwrap().training_status(),
            Some(TrainingStatus::Pending)
        );
    }

    #[test]
    fn output_info_path() {
        let request = GetModelOutputInfo::new("general").request().unwrap();
        assert_eq!(request.path().unwrap(), "/v2/models/general/output_info");
        assert_eq!(request.rpc, "GetModelOutputInfo");
    }
}
