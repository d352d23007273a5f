//! # Unary gRPC Client
//!
//! [`UnaryClient`] sends one `DynamicMessage` to one RPC and reads the answer back as JSON
//! through [`super::codec::JsonCodec`]. It never looks at the message contents.
//!
//! * The request path (e.g. `/clarifai.api.V2/PostModelOutputs`) is derived from the
//!   `MethodDescriptor` at runtime.
//! * Every call carries the API key (`authorization: Key ...`) and the client identification
//!   (`x-clarifai-client`) as metadata.
use super::codec::JsonCodec;
use crate::{BoxError, CLIENT_VERSION};
use http::uri::PathAndQuery;
use http_body::Body as HttpBody;
use prost_reflect::{DynamicMessage, MethodDescriptor};
use tonic::{
    Request, Response, Status,
    client::{Grpc, GrpcService},
    metadata::{AsciiMetadataValue, errors::InvalidMetadataValue},
    transport::Channel,
};

#[derive(thiserror::Error, Debug)]
pub enum UnaryCallError {
    #[error("Internal error, the gRPC service was not ready: '{0}'")]
    NotReady(#[source] BoxError),
    #[error("The API key is not a valid metadata value: '{0}'")]
    InvalidApiKey(#[source] InvalidMetadataValue),
    #[error("'{0}' is not a valid RPC path")]
    InvalidPath(String),
}

/// Performs unary calls with dynamic messages over any tonic service.
#[derive(Debug, Clone)]
pub struct UnaryClient<S = Channel> {
    grpc: Grpc<S>,
}

impl<S> UnaryClient<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    pub fn new(service: S) -> Self {
        Self {
            grpc: Grpc::new(service),
        }
    }

    /// Calls `method` with an already validated `message`.
    ///
    /// # Returns
    /// * `Ok(Ok(Value))` - The server answered `OK`; the response message as JSON.
    /// * `Ok(Err(Status))` - The server answered with an error status.
    /// * `Err(UnaryCallError)` - The call could not be made.
    pub async fn call(
        &mut self,
        method: &MethodDescriptor,
        message: DynamicMessage,
        api_key: &str,
    ) -> Result<Result<serde_json::Value, Status>, UnaryCallError> {
        let path = rpc_path(method)?;
        let request = authorized(message, api_key)?;

        self.grpc
            .ready()
            .await
            .map_err(|e| UnaryCallError::NotReady(e.into()))?;

        Ok(self
            .grpc
            .unary(request, path, JsonCodec::new(method.output()))
            .await
            .map(Response::into_inner))
    }
}

fn rpc_path(method: &MethodDescriptor) -> Result<PathAndQuery, UnaryCallError> {
    let path = format!("/{}/{}", method.parent_service().full_name(), method.name());
    PathAndQuery::try_from(path.as_str()).map_err(|_| UnaryCallError::InvalidPath(path))
}

fn authorized(
    message: DynamicMessage,
    api_key: &str,
) -> Result<Request<DynamicMessage>, UnaryCallError> {
    let authorization = AsciiMetadataValue::try_from(format!("Key {api_key}"))
        .map_err(UnaryCallError::InvalidApiKey)?;

    let mut request = Request::new(message);
    let metadata = request.metadata_mut();
    metadata.insert("authorization", authorization);
    metadata.insert("x-clarifai-client", AsciiMetadataValue::from_static(CLIENT_VERSION));
    Ok(request)
}
