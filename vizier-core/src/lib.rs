//! # Vizier Core
//!
//! `vizier-core` is a typed client for a computer-vision prediction API (concepts, inputs,
//! models, searches, workflows and feedback). Every call goes through the same pipeline:
//! an endpoint builds an [`request::ApiRequest`], a [`transport::Transport`] performs exactly
//! one network call, and the raw answer is interpreted into an [`response::ApiResponse`].
//!
//! ## Key Components
//!
//! * **[`VizierClient`]:** The main entry point. It wraps a transport and exposes one method per
//!   supported endpoint, plus [`VizierClient::execute`] for any [`endpoints::Endpoint`].
//! * **[`transport::HttpTransport`]:** Plain JSON over HTTP, built on `reqwest`.
//! * **[`transport::GrpcTransport`]:** JSON transcoded to Protobuf on the fly and sent over
//!   gRPC with `tonic`. Responses come back as JSON with the proto (snake_case) field names,
//!   so both transports feed the exact same deserialization code.
//! * **[`response::ApiResponse`]:** Carries the [`status::Outcome`] classification, the raw
//!   HTTP code and body, the status envelope and the typed payload.
//!
//! ## Errors
//!
//! Network failures, non-2xx answers and malformed bodies are *not* errors: they are reported
//! through [`status::Outcome`]. `Err` is reserved for programmer mistakes such as an RPC that
//! does not exist in the schema or an invalid search clause.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect`, `reqwest` and `tonic` so consumers use
//! compatible versions when building their own channels or descriptor pools.
pub mod client;
pub mod config;
pub mod endpoints;
pub mod grpc;
pub mod request;
pub mod response;
pub mod schema;
pub mod status;
pub mod transport;
pub mod types;

pub use client::VizierClient;

// Re-exports
pub use prost;
pub use prost_reflect;
pub use reqwest;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Value sent in the client identification header.
pub const CLIENT_VERSION: &str = concat!("rust:", env!("CARGO_PKG_VERSION"));
