//! # JSON/HTTP Transport
//!
//! Sends an [`ApiRequest`] as a plain HTTP call: the verb and rendered path are used as-is,
//! pagination becomes `page`/`per_page` query parameters and the body is sent as JSON.
use super::{NetworkFailure, RawResponse, Transport};
use crate::{
    CLIENT_VERSION,
    request::{ApiRequest, RequestError},
};
use http::Method;
use reqwest::{
    Client, Url,
    header::{AUTHORIZATION, HeaderName, HeaderValue},
};
use tracing::debug;

const CLIENT_HEADER: HeaderName = HeaderName::from_static("x-clarifai-client");

/// JSON over HTTP, authenticated with an API key.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpTransport {
    /// Creates a transport for the API rooted at `base_url` (e.g. `https://api.clarifai.com`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, RequestError> {
        let parsed =
            Url::parse(base_url).map_err(|_| RequestError::InvalidBaseUrl(base_url.to_string()))?;

        if parsed.cannot_be_a_base() {
            return Err(RequestError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: parsed,
            api_key: api_key.into(),
        })
    }

    /// Replaces the underlying `reqwest` client (timeouts, proxies, TLS settings...).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, RequestError> {
        let segments = request.segments()?;
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if let Some(pagination) = request.pagination {
            url.query_pairs_mut()
                .append_pair("page", &pagination.page.to_string())
                .append_pair("per_page", &pagination.per_page.to_string());
        }

        Ok(url)
    }

    fn authorization(&self) -> Result<HeaderValue, RequestError> {
        HeaderValue::from_str(&format!("Key {}", self.api_key)).map_err(|e| {
            RequestError::InvalidMetadata {
                key: AUTHORIZATION.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl Transport for HttpTransport {
    #[tracing::instrument(skip_all, fields(method = %request.method, rpc = request.rpc))]
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<Result<RawResponse, NetworkFailure>, RequestError> {
        if ![Method::GET, Method::POST, Method::PATCH, Method::DELETE].contains(&request.method) {
            return Err(RequestError::UnsupportedMethod(request.method));
        }

        let url = self.url_for(&request)?;
        debug!(%url, "sending HTTP request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, self.authorization()?)
            .header(CLIENT_HEADER, HeaderValue::from_static(CLIENT_VERSION));

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Ok(Err(err.into())),
        };

        let http_code = response.status().as_u16();

        match response.text().await {
            Ok(body) => {
                debug!(http_code, "received HTTP response");
                Ok(Ok(RawResponse { http_code, body }))
            }
            Err(err) => Ok(Err(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Pagination;

    #[test]
    fn builds_urls_with_encoded_params_and_pagination() {
        let transport = HttpTransport::new("https://api.example.com", "key").unwrap();

        let request = ApiRequest::new(Method::GET, "/v2/concepts/{concept_id}", "GetConcept")
            .path_param("concept_id", "red car/blue");
        assert_eq!(
            transport.url_for(&request).unwrap().as_str(),
            "https://api.example.com/v2/concepts/red%20car%2Fblue"
        );

        let request = ApiRequest::new(Method::GET, "/v2/models", "ListModels")
            .pagination(Some(Pagination::new(3, 10)));
        assert_eq!(
            transport.url_for(&request).unwrap().as_str(),
            "https://api.example.com/v2/models?page=3&per_page=10"
        );
    }

    #[test]
    fn keeps_a_base_path_prefix() {
        let transport = HttpTransport::new("http://localhost:8080/proxy/", "key").unwrap();
        let request = ApiRequest::new(Method::POST, "/v2/concepts/", "PostConcepts");

        assert_eq!(
            transport.url_for(&request).unwrap().as_str(),
            "http://localhost:8080/proxy/v2/concepts/"
        );
    }

    #[test]
    fn rejects_invalid_base_urls() {
        assert!(matches!(
            HttpTransport::new("not a url", "key"),
            Err(RequestError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpTransport::new("mailto:someone@example.com", "key"),
            Err(RequestError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn unsupported_methods_are_rejected_before_sending() {
        let transport = HttpTransport::new("http://127.0.0.1:9", "key").unwrap();
        let request = ApiRequest::new(Method::PUT, "/v2/inputs", "PostInputs");

        match transport.send(request).await {
            Err(RequestError::UnsupportedMethod(method)) => assert_eq!(method, Method::PUT),
            other => panic!("expected an unsupported method error, got {other:?}"),
        }
    }
}
