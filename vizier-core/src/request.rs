//! # Transport-neutral Requests
//!
//! An [`ApiRequest`] describes one API call in a way both transports understand:
//!
//! * the HTTP transport uses the verb, the rendered path, the pagination as query
//!   parameters and the JSON body;
//! * the gRPC transport uses the RPC name and a single JSON body in which path parameters
//!   and pagination are merged as top-level fields (see [`ApiRequest::rpc_body`]).
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Programmer errors: the request can never succeed, regardless of the network.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Unsupported HTTP method '{0}', expected GET, POST, PATCH or DELETE")]
    UnsupportedMethod(Method),
    #[error("Missing value for path parameter '{name}' in '{template}'")]
    MissingPathParam {
        name: &'static str,
        template: &'static str,
    },
    #[error("Request body for '{0}' must be a JSON object")]
    InvalidBody(&'static str),
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("Service '{0}' not found in the descriptor pool")]
    ServiceNotFound(String),
    #[error("RPC method '{method}' not found in service '{service}'")]
    MethodNotFound { service: String, method: String },
    #[error("Request body does not match the schema of '{rpc}': '{source}'")]
    SchemaMismatch {
        rpc: String,
        source: serde_json::Error,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{reason}'")]
    InvalidMetadata { key: String, reason: String },
    #[error("Invalid search: {0}")]
    InvalidSearch(String),
    #[error("Failed to serialize request body: '{0}'")]
    Serialize(#[from] serde_json::Error),
}

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }
}

/// A single API call, independent of the transport that will carry it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// REST path with `{name}` placeholders, e.g. `/v2/models/{model_id}/outputs`.
    pub path_template: &'static str,
    pub path_params: Vec<(&'static str, String)>,
    pub pagination: Option<Pagination>,
    pub body: Option<Value>,
    /// Name of the matching RPC in the `V2` service, e.g. `PostModelOutputs`.
    pub rpc: &'static str,
}

impl ApiRequest {
    pub fn new(method: Method, path_template: &'static str, rpc: &'static str) -> Self {
        Self {
            method,
            path_template,
            path_params: Vec::new(),
            pagination: None,
            body: None,
            rpc,
        }
    }

    pub fn path_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push((name, value.into()));
        self
    }

    pub fn pagination(mut self, pagination: Option<Pagination>) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path segments with placeholders substituted by their raw (unencoded) values.
    ///
    /// A trailing `/` in the template yields a final empty segment.
    pub fn segments(&self) -> Result<Vec<String>, RequestError> {
        self.path_template
            .trim_start_matches('/')
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(name) => self
                    .path_params
                    .iter()
                    .find(|(param, _)| *param == name)
                    .map(|(_, value)| value.clone())
                    .ok_or(RequestError::MissingPathParam {
                        name,
                        template: self.path_template,
                    }),
                None => Ok(segment.to_string()),
            })
            .collect()
    }

    /// The rendered path, e.g. `/v2/models/general/outputs`. Values are not percent-encoded.
    pub fn path(&self) -> Result<String, RequestError> {
        Ok(format!("/{}", self.segments()?.join("/")))
    }

    /// The body sent over gRPC: the JSON body plus path parameters and pagination as fields.
    pub fn rpc_body(&self) -> Result<Value, RequestError> {
        let mut fields = match &self.body {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(RequestError::InvalidBody(self.rpc)),
        };

        for (name, value) in &self.path_params {
            fields.insert(name.to_string(), Value::String(value.clone()));
        }

        if let Some(pagination) = self.pagination {
            fields.insert("page".to_string(), Value::from(pagination.page));
            fields.insert("per_page".to_string(), Value::from(pagination.per_page));
        }

        Ok(Value::Object(fields))
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
