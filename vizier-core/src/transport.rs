//! # Transports
//!
//! A [`Transport`] carries one [`ApiRequest`] to the API and hands back the raw answer.
//! Two implementations exist:
//!
//! * **[`HttpTransport`]**: JSON over HTTP with `reqwest`.
//! * **[`GrpcTransport`]**: the same JSON transcoded to Protobuf and sent over gRPC with
//!   `tonic`; the answer is converted back to JSON using proto field names.
//!
//! Both return `Result<Result<RawResponse, NetworkFailure>, RequestError>`:
//!
//! * `Ok(Ok(raw))` - The server answered (with any status code).
//! * `Ok(Err(failure))` - No usable answer: connection, TLS, timeout...
//! * `Err(RequestError)` - The request itself is invalid and was never sent.
mod grpc;
mod rest;

pub use self::grpc::{ClientConnectError, GrpcTransport};
pub use self::rest::HttpTransport;

use crate::{BoxError, request::ApiRequest, request::RequestError};
use std::future::Future;

/// A received answer, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub http_code: u16,
    pub body: String,
}

/// Failures that prevent a response from being received.
#[derive(Debug, thiserror::Error)]
pub enum NetworkFailure {
    #[error("HTTP transport error: '{0}'")]
    Http(#[from] reqwest::Error),
    #[error("gRPC transport error: '{0}'")]
    Grpc(#[source] tonic::Status),
    #[error("Internal error, the gRPC client was not ready: '{0}'")]
    ClientNotReady(#[source] BoxError),
}

/// Sends a single request and returns the raw answer.
///
/// Implementations must be usable concurrently through a shared reference: every call is
/// independent and no per-call state is kept on the transport.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<Result<RawResponse, NetworkFailure>, RequestError>> + Send;
}

/// A transport chosen at runtime, e.g. from a [`crate::config::ClientConfig`].
#[derive(Debug, Clone)]
pub enum AnyTransport {
    Http(HttpTransport),
    Grpc(GrpcTransport),
}

impl Transport for AnyTransport {
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<Result<RawResponse, NetworkFailure>, RequestError> {
        match self {
            AnyTransport::Http(transport) => transport.send(request).await,
            AnyTransport::Grpc(transport) => transport.send(request).await,
        }
    }
}
