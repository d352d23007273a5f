//! # Response Interpretation
//!
//! Turns whatever a transport produced (a raw answer or a network failure) into an
//! [`ApiResponse`]. Malformed JSON, transport failures and non-2xx answers all become an
//! [`Outcome`], never an error. A body that is not a JSON object is a
//! [`Outcome::NetworkError`] whatever the HTTP code, since no status can be read from it.
use crate::{
    status::{Outcome, Status},
    transport::{NetworkFailure, RawResponse},
};
use serde_json::Value;
use tracing::{debug, warn};

/// The result of one API call.
///
/// Always check [`ApiResponse::outcome`] before trusting [`ApiResponse::get`]: on failures the
/// payload is `T::default()`.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    outcome: Outcome,
    http_code: Option<u16>,
    raw_body: String,
    status: Option<Status>,
    failure_reason: Option<String>,
    payload: T,
}

impl<T> ApiResponse<T> {
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_successful(&self) -> bool {
        self.outcome == Outcome::Successful
    }

    pub fn is_mixed_success(&self) -> bool {
        self.outcome == Outcome::MixedSuccess
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }

    pub fn is_network_error(&self) -> bool {
        self.outcome == Outcome::NetworkError
    }

    /// The HTTP status code, or `None` when no answer was received.
    pub fn http_code(&self) -> Option<u16> {
        self.http_code
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// The top-level status envelope, if the body contained one.
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Why the call ended up as a network error, when it did.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn get(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            outcome: self.outcome,
            http_code: self.http_code,
            raw_body: self.raw_body,
            status: self.status,
            failure_reason: self.failure_reason,
            payload: f(self.payload),
        }
    }
}

impl<T: Default> ApiResponse<T> {
    fn network_error(http_code: Option<u16>, raw_body: String, reason: String) -> Self {
        Self {
            outcome: Outcome::NetworkError,
            http_code,
            raw_body,
            status: None,
            failure_reason: Some(reason),
            payload: T::default(),
        }
    }
}

/// Interprets a transport result, decoding the payload with `decode` when possible.
pub(crate) fn interpret<T, F>(result: Result<RawResponse, NetworkFailure>, decode: F) -> ApiResponse<T>
where
    T: Default,
    F: FnOnce(&Value) -> Result<T, serde_json::Error>,
{
    let raw = match result {
        Ok(raw) => raw,
        Err(failure) => {
            warn!(error = %failure, "request failed before a response was received");
            return ApiResponse::network_error(None, String::new(), failure.to_string());
        }
    };

    let value: Value = match serde_json::from_str(&raw.body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            warn!(http_code = raw.http_code, "response body is not a JSON object");
            return ApiResponse::network_error(
                Some(raw.http_code),
                raw.body,
                "Unexpected response shape: the body is not a JSON object".to_string(),
            );
        }
        Err(err) => {
            warn!(http_code = raw.http_code, error = %err, "unparseable response body");
            return ApiResponse::network_error(
                Some(raw.http_code),
                raw.body,
                format!("Unparseable response body: {err}"),
            );
        }
    };

    let status = value
        .get("status")
        .and_then(|status| serde_json::from_value::<Status>(status.clone()).ok());
    let outcome = Outcome::classify(raw.http_code, status.as_ref().map(|s| s.code));
    debug!(http_code = raw.http_code, %outcome, "response classified");

    let payload = if outcome.is_ok() {
        match decode(&value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "response body does not have the expected shape");
                let mut response = ApiResponse::network_error(
                    Some(raw.http_code),
                    raw.body,
                    format!("Unexpected response shape: {err}"),
                );
                response.status = status;
                return response;
            }
        }
    } else {
        // The call already failed; a decode error here would only hide the real cause.
        decode(&value).unwrap_or_default()
    };

    ApiResponse {
        outcome,
        http_code: Some(raw.http_code),
        raw_body: raw.body,
        status,
        failure_reason: None,
        payload,
    }
}
