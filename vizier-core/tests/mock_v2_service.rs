use prost_reflect::{DescriptorPool, DynamicMessage, MethodDescriptor};
use serde_json::Value;
use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};
use tonic::{
    Request, Response, Status,
    codegen::{Body, BoxFuture, Service, StdError, http},
    server::{Grpc, UnaryService},
};
use vizier_core::{grpc::codec::JsonCodec, schema};

/// A request received by the mock, as JSON with proto field names.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub rpc: String,
    pub body: Value,
    pub authorization: Option<String>,
}

/// An in-process `clarifai.api.V2` server answering every RPC from canned JSON.
#[derive(Clone)]
pub struct MockV2Service {
    pool: DescriptorPool,
    answers: Arc<HashMap<String, Result<Value, Status>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockV2Service {
    pub fn new(answers: impl IntoIterator<Item = (&'static str, Result<Value, Status>)>) -> Self {
        Self {
            pool: schema::descriptor_pool().expect("built-in schema is valid"),
            answers: Arc::new(
                answers
                    .into_iter()
                    .map(|(rpc, answer)| (rpc.to_string(), answer))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn method(&self, path: &str) -> Option<MethodDescriptor> {
        let (service, rpc) = path.trim_start_matches('/').split_once('/')?;
        self.pool
            .get_service_by_name(service)?
            .methods()
            .find(|m| m.name() == rpc)
    }
}

struct Handler {
    method: MethodDescriptor,
    mock: MockV2Service,
}

impl UnaryService<Value> for Handler {
    type Response = DynamicMessage;
    type Future = BoxFuture<Response<DynamicMessage>, Status>;

    fn call(&mut self, request: Request<Value>) -> Self::Future {
        let rpc = self.method.name().to_string();
        let authorization = request
            .metadata()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        self.mock.calls.lock().unwrap().push(RecordedCall {
            rpc: rpc.clone(),
            body: request.into_inner(),
            authorization,
        });

        let answer = self
            .mock
            .answers
            .get(&rpc)
            .cloned()
            .unwrap_or_else(|| Err(Status::unimplemented(format!("no canned answer for {rpc}"))));
        let output = self.method.output();

        Box::pin(async move {
            let json = answer?;
            let message = DynamicMessage::deserialize(output, json)
                .map_err(|e| Status::internal(format!("canned answer does not fit: {e}")))?;
            Ok(Response::new(message))
        })
    }
}

impl<B> Service<http::Request<B>> for MockV2Service
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::Body>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        match self.method(req.uri().path()) {
            Some(method) => {
                let handler = Handler {
                    method: method.clone(),
                    mock: self.clone(),
                };
                Box::pin(async move {
                    let mut grpc = Grpc::new(JsonCodec::new(method.input()));
                    Ok(grpc.unary(handler, req).await)
                })
            }
            None => Box::pin(async move { Ok(Status::unimplemented("unknown method").into_http()) }),
        }
    }
}
