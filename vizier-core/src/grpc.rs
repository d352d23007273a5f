//! # Generic gRPC Transport
//!
//! Low-level building blocks for performing unary gRPC calls with dynamic message types.
//!
//! Unlike standard `tonic` clients which are strongly typed, the components here work with
//! `prost_reflect::DynamicMessage` on the way out and `serde_json::Value` on the way back,
//! so the rest of the crate can stay JSON-shaped whatever transport is in use.
pub mod client;
pub mod codec;
