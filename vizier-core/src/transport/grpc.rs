//! # JSON-over-gRPC Transport
//!
//! Carries an [`ApiRequest`] as a unary gRPC call to the `V2` service:
//!
//! 1. The RPC named by the request is looked up in the descriptor pool.
//! 2. Path parameters and pagination are merged into the JSON body ([`ApiRequest::rpc_body`]).
//! 3. The body is validated against the RPC's input descriptor and sent as Protobuf.
//! 4. The answer is decoded back to JSON with proto field names, so the rest of the pipeline
//!    cannot tell it apart from an HTTP answer. A gRPC `OK` is reported as HTTP 200.
use super::{NetworkFailure, RawResponse, Transport};
use crate::{
    BoxError,
    grpc::client::{UnaryCallError, UnaryClient},
    request::{ApiRequest, RequestError},
    schema,
    status::codes,
};
use http_body::Body as HttpBody;
use prost_reflect::{DescriptorError, DescriptorPool, DynamicMessage, MethodDescriptor};
use tonic::{
    Code,
    client::GrpcService,
    transport::{Channel, ClientTlsConfig, Endpoint},
};
use tracing::debug;

/// Errors that can occur when connecting to a gRPC server.
#[derive(Debug, thiserror::Error)]
pub enum ClientConnectError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
    #[error("Failed to build the built-in schema: '{0}'")]
    Schema(#[from] DescriptorError),
}

/// JSON transcoded to Protobuf over gRPC, authenticated with an API key.
#[derive(Debug, Clone)]
pub struct GrpcTransport<S = Channel> {
    client: UnaryClient<S>,
    pool: DescriptorPool,
    api_key: String,
}

impl GrpcTransport<Channel> {
    /// Connects to a gRPC endpoint (e.g. `https://api.clarifai.com`) using the built-in schema.
    ///
    /// `https` endpoints use TLS with the bundled web PKI roots.
    pub async fn connect(addr: &str, api_key: impl Into<String>) -> Result<Self, ClientConnectError> {
        let mut endpoint = Endpoint::new(addr.to_string())
            .map_err(|e| ClientConnectError::InvalidUrl(addr.to_string(), e))?;

        if addr.starts_with("https://") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_webpki_roots())
                .map_err(|e| ClientConnectError::InvalidUrl(addr.to_string(), e))?;
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ClientConnectError::ConnectionFailed(addr.to_string(), e))?;

        Ok(Self::from_service(channel, api_key)?)
    }
}

impl<S> GrpcTransport<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Creates a transport from an existing Tonic service/channel using the built-in schema.
    pub fn from_service(service: S, api_key: impl Into<String>) -> Result<Self, DescriptorError> {
        Ok(Self {
            client: UnaryClient::new(service),
            pool: schema::descriptor_pool()?,
            api_key: api_key.into(),
        })
    }

    /// Replaces the built-in schema with an encoded `FileDescriptorSet`.
    ///
    /// The set must define the `clarifai.api.V2` service.
    pub fn with_file_descriptor(self, file_descriptor: Vec<u8>) -> Result<Self, DescriptorError> {
        let pool = DescriptorPool::decode(file_descriptor.as_slice())?;
        Ok(Self { pool, ..self })
    }

    pub fn descriptor_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    fn method(&self, rpc: &str) -> Result<MethodDescriptor, RequestError> {
        self.pool
            .get_service_by_name(schema::SERVICE)
            .ok_or_else(|| RequestError::ServiceNotFound(schema::SERVICE.to_string()))?
            .methods()
            .find(|m| m.name() == rpc)
            .ok_or_else(|| RequestError::MethodNotFound {
                service: schema::SERVICE.to_string(),
                method: rpc.to_string(),
            })
    }
}

impl<S> Transport for GrpcTransport<S>
where
    S: GrpcService<tonic::body::Body> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    #[tracing::instrument(skip_all, fields(rpc = request.rpc))]
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<Result<RawResponse, NetworkFailure>, RequestError> {
        let method = self.method(request.rpc)?;
        let body = request.rpc_body()?;
        let message = DynamicMessage::deserialize(method.input(), body).map_err(|source| {
            RequestError::SchemaMismatch {
                rpc: request.rpc.to_string(),
                source,
            }
        })?;

        debug!(method = method.full_name(), "sending gRPC request");
        let mut client = self.client.clone();

        match client.call(&method, message, &self.api_key).await {
            Ok(Ok(value)) => Ok(Ok(RawResponse {
                http_code: 200,
                body: value.to_string(),
            })),
            Ok(Err(status)) => Ok(status_to_response(status)),
            Err(UnaryCallError::NotReady(e)) => Ok(Err(NetworkFailure::ClientNotReady(e))),
            Err(UnaryCallError::InvalidApiKey(source)) => Err(RequestError::InvalidMetadata {
                key: "authorization".to_string(),
                reason: source.to_string(),
            }),
            Err(UnaryCallError::InvalidPath(_)) => Err(RequestError::MethodNotFound {
                service: schema::SERVICE.to_string(),
                method: request.rpc.to_string(),
            }),
        }
    }
}

/// Turns a non-OK gRPC status into the answer an HTTP gateway would have produced.
///
/// Statuses that mean the server was never reached stay network failures.
fn status_to_response(status: tonic::Status) -> Result<RawResponse, NetworkFailure> {
    let http_code = match status.code() {
        Code::Unavailable | Code::Cancelled | Code::DeadlineExceeded => {
            return Err(NetworkFailure::Grpc(status));
        }
        Code::Ok => 200,
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => 400,
        Code::Unauthenticated => 401,
        Code::PermissionDenied => 403,
        Code::NotFound => 404,
        Code::AlreadyExists | Code::Aborted => 409,
        Code::ResourceExhausted => 429,
        Code::Unimplemented => 501,
        _ => 500,
    };

    let body = serde_json::json!({
        "status": {
            "code": codes::FAILURE,
            "description": status.message(),
            "details": format!("gRPC status {:?}", status.code()),
        }
    });

    Ok(RawResponse {
        http_code,
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn grpc_errors_map_to_http_codes() {
        let raw = status_to_response(tonic::Status::not_found("Model does not exist")).unwrap();
        assert_eq!(raw.http_code, 404);

        let body: Value = serde_json::from_str(&raw.body).unwrap();
        assert_eq!(body["status"]["code"], codes::FAILURE);
        assert_eq!(body["status"]["description"], "Model does not exist");

        let raw = status_to_response(tonic::Status::unauthenticated("bad key")).unwrap();
        assert_eq!(raw.http_code, 401);
    }

    #[test]
    fn unreachable_servers_are_network_failures() {
        assert!(matches!(
            status_to_response(tonic::Status::unavailable("connection refused")),
            Err(NetworkFailure::Grpc(_))
        ));
        assert!(matches!(
            status_to_response(tonic::Status::deadline_exceeded("too slow")),
            Err(NetworkFailure::Grpc(_))
        ));
    }
}
