//! # Vizier Client
//!
//! [`VizierClient`] executes [`Endpoint`]s over a [`Transport`]. Each call performs exactly one
//! network request and returns an [`ApiResponse`], whose [`Outcome`](crate::status::Outcome)
//! tells apart successes, partial successes, API failures and network errors.
//!
//! The transport is a type parameter, so the same code runs over HTTP or gRPC:
//!
//! ```rust,no_run
//! use vizier_core::{VizierClient, transport::GrpcTransport, types::Input};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! // JSON over HTTP
//! let client = VizierClient::http("https://api.clarifai.com", "my-api-key")?;
//!
//! // JSON transcoded to Protobuf over gRPC
//! let transport = GrpcTransport::connect("https://api.clarifai.com", "my-api-key").await?;
//! let grpc_client = VizierClient::new(transport);
//!
//! let response = grpc_client
//!     .predict("general", [Input::image_url("https://samples.example.com/metro-north.jpg")])
//!     .await?;
//! println!("{} outputs ({})", response.get().len(), response.outcome());
//! # Ok(())
//! # }
//! ```
use crate::{
    config::{ClientConfig, TransportKind},
    endpoints::{
        AddConcepts, AddInputs, DeleteInput, DeleteInputs, Endpoint, GetConcept, GetInput,
        GetInputCount, GetModel, GetModelOutputInfo, ListConcepts, ListInputs, ListModels,
        Predict, SearchInputs, TrainModel, WorkflowPredict,
    },
    request::{Pagination, RequestError},
    response::{ApiResponse, interpret},
    transport::{AnyTransport, ClientConnectError, GrpcTransport, HttpTransport, Transport},
    types::{
        Concept, Input, InputCount, Model, ModelOutput, SearchBy, SearchHit,
        WorkflowPredictResult,
    },
};
use tracing::debug;

/// Errors that can occur when building a client from a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Http(#[from] RequestError),
    #[error(transparent)]
    Grpc(#[from] ClientConnectError),
}

/// Typed access to the API over any [`Transport`].
#[derive(Debug, Clone)]
pub struct VizierClient<T = HttpTransport> {
    transport: T,
}

impl VizierClient<HttpTransport> {
    pub fn http(base_url: &str, api_key: impl Into<String>) -> Result<Self, RequestError> {
        Ok(Self::new(HttpTransport::new(base_url, api_key)?))
    }
}

impl VizierClient<AnyTransport> {
    /// Builds a client with the transport selected by the configuration.
    ///
    /// The gRPC transport connects eagerly; the HTTP one connects on the first call.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ConnectError> {
        debug!(base_url = %config.base_url, transport = %config.transport, "building client");

        let transport = match config.transport {
            TransportKind::Http => {
                AnyTransport::Http(HttpTransport::new(&config.base_url, config.api_key.clone())?)
            }
            TransportKind::Grpc => AnyTransport::Grpc(
                GrpcTransport::connect(&config.base_url, config.api_key.clone()).await?,
            ),
        };

        Ok(Self::new(transport))
    }
}

impl<T: Transport> VizierClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the endpoint's request and interprets the answer.
    ///
    /// # Returns
    ///
    /// * `Ok(response)` - One request was made; inspect `response.outcome()`.
    /// * `Err(RequestError)` - The request was invalid and nothing was sent.
    pub async fn execute<E: Endpoint>(&self, endpoint: &E) -> Result<ApiResponse<E::Output>, RequestError> {
        let request = endpoint.request()?;
        let result = self.transport.send(request).await?;
        Ok(interpret(result, |body| endpoint.decode(body)))
    }

    pub async fn get_concept(&self, concept_id: impl Into<String>) -> Result<ApiResponse<Concept>, RequestError> {
        self.execute(&GetConcept::new(concept_id)).await
    }

    pub async fn list_concepts(
        &self,
        pagination: Option<Pagination>,
    ) -> Result<ApiResponse<Vec<Concept>>, RequestError> {
        self.execute(&ListConcepts { pagination }).await
    }

    pub async fn add_concepts(
        &self,
        concepts: impl IntoIterator<Item = Concept>,
    ) -> Result<ApiResponse<Vec<Concept>>, RequestError> {
        self.execute(&AddConcepts::new(concepts)).await
    }

    pub async fn add_inputs(
        &self,
        inputs: impl IntoIterator<Item = Input>,
    ) -> Result<ApiResponse<Vec<Input>>, RequestError> {
        self.execute(&AddInputs::new(inputs)).await
    }

    pub async fn get_input(&self, input_id: impl Into<String>) -> Result<ApiResponse<Input>, RequestError> {
        self.execute(&GetInput::new(input_id)).await
    }

    pub async fn list_inputs(
        &self,
        pagination: Option<Pagination>,
    ) -> Result<ApiResponse<Vec<Input>>, RequestError> {
        self.execute(&ListInputs { pagination }).await
    }

    pub async fn delete_input(&self, input_id: impl Into<String>) -> Result<ApiResponse<()>, RequestError> {
        self.execute(&DeleteInput::new(input_id)).await
    }

    pub async fn delete_inputs(&self, selection: DeleteInputs) -> Result<ApiResponse<()>, RequestError> {
        self.execute(&selection).await
    }

    pub async fn input_count(&self) -> Result<ApiResponse<InputCount>, RequestError> {
        self.execute(&GetInputCount).await
    }

    pub async fn get_model(&self, model_id: impl Into<String>) -> Result<ApiResponse<Model>, RequestError> {
        self.execute(&GetModel::new(model_id)).await
    }

    pub async fn list_models(
        &self,
        pagination: Option<Pagination>,
    ) -> Result<ApiResponse<Vec<Model>>, RequestError> {
        self.execute(&ListModels { pagination }).await
    }

    pub async fn model_output_info(
        &self,
        model_id: impl Into<String>,
    ) -> Result<ApiResponse<Model>, RequestError> {
        self.execute(&GetModelOutputInfo::new(model_id)).await
    }

    pub async fn train_model(&self, model_id: impl Into<String>) -> Result<ApiResponse<Model>, RequestError> {
        self.execute(&TrainModel::new(model_id)).await
    }

    /// Runs a model with default options. Use [`Predict`] with [`VizierClient::execute`] for
    /// versions, model types or output tuning.
    pub async fn predict(
        &self,
        model_id: impl Into<String>,
        inputs: impl IntoIterator<Item = Input>,
    ) -> Result<ApiResponse<Vec<ModelOutput>>, RequestError> {
        self.execute(&Predict::new(model_id).inputs(inputs)).await
    }

    pub async fn search(
        &self,
        clauses: impl IntoIterator<Item = SearchBy>,
    ) -> Result<ApiResponse<Vec<SearchHit>>, RequestError> {
        self.execute(&SearchInputs::new(clauses)).await
    }

    pub async fn workflow_predict(
        &self,
        workflow_id: impl Into<String>,
        input: Input,
    ) -> Result<ApiResponse<WorkflowPredictResult>, RequestError> {
        self.execute(&WorkflowPredict::new(workflow_id).input(input)).await
    }
}
