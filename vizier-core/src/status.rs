//! # Status Envelope & Outcome Classification
//!
//! Every API answer (and every item inside a batch answer) carries a status envelope with a
//! numeric code. On top of it the client derives an [`Outcome`], which only looks at the HTTP
//! code and at the mixed-success sentinel:
//!
//! | HTTP code | envelope code | outcome |
//! |-----------|---------------|---------|
//! | 2xx       | 10010         | [`Outcome::MixedSuccess`] |
//! | 2xx       | anything else | [`Outcome::Successful`] |
//! | other     | anything      | [`Outcome::Failure`] |
//!
//! [`Outcome::NetworkError`] is assigned before any of this: when no answer arrived at all, or
//! when the body is not a JSON object (HTML error pages, truncated JSON). That holds whatever the
//! HTTP code is, a 502 with an HTML body included.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known status codes used by the API.
pub mod codes {
    pub const SUCCESS: u32 = 10000;
    /// Some items of a batch succeeded and some failed.
    pub const MIXED_STATUS: u32 = 10010;
    pub const FAILURE: u32 = 10020;
    pub const TRY_AGAIN: u32 = 10030;
    pub const NOT_IMPLEMENTED: u32 = 10040;

    pub const CONN_ACCOUNT_ISSUES: u32 = 11000;
    pub const CONN_TOKEN_INVALID: u32 = 11001;
    pub const CONN_CREDENTIALS_INVALID: u32 = 11002;
    pub const CONN_EXCEED_HOURLY_LIMIT: u32 = 11003;
    pub const CONN_EXCEED_MONTHLY_LIMIT: u32 = 11004;
    pub const CONN_THROTTLED: u32 = 11005;
    pub const CONN_KEY_INVALID: u32 = 11009;

    pub const MODEL_TRAINED: u32 = 21100;
    pub const MODEL_TRAINING: u32 = 21101;
    pub const MODEL_UNTRAINED: u32 = 21102;
    pub const MODEL_QUEUED_FOR_TRAINING: u32 = 21103;
    pub const MODEL_TRAINING_NO_DATA: u32 = 21110;
    pub const MODEL_TRAINING_NO_POSITIVES: u32 = 21111;
    pub const MODEL_TRAINING_ONE_VS_N_SINGLE_CLASS: u32 = 21112;
    pub const MODEL_TRAINING_TIMED_OUT: u32 = 21113;
    pub const MODEL_TRAINING_WAITING_ERROR: u32 = 21114;
    pub const MODEL_TRAINING_UNKNOWN_ERROR: u32 = 21115;

    pub const MODEL_EVALUATED: u32 = 21300;
    pub const MODEL_EVALUATING: u32 = 21301;
    pub const MODEL_NOT_EVALUATED: u32 = 21302;
    pub const MODEL_QUEUED_FOR_EVALUATION: u32 = 21303;
    pub const MODEL_EVALUATION_TIMED_OUT: u32 = 21310;
    pub const MODEL_EVALUATION_WAITING_ERROR: u32 = 21311;
    pub const MODEL_EVALUATION_UNKNOWN_ERROR: u32 = 21312;

    pub const INPUT_DOWNLOAD_SUCCESS: u32 = 30000;
    pub const INPUT_DOWNLOAD_PENDING: u32 = 30001;
    pub const INPUT_DOWNLOAD_FAILED: u32 = 30002;
    pub const INPUT_DOWNLOAD_IN_PROGRESS: u32 = 30003;
}

/// The status envelope attached to responses and to batch items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Status {
    pub fn is_success(&self) -> bool {
        self.code == codes::SUCCESS
    }

    pub fn is_mixed_success(&self) -> bool {
        self.code == codes::MIXED_STATUS
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.description)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

/// Client-side classification of a single API answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Successful,
    /// The call went through but part of the batch failed. Inspect per-item statuses.
    MixedSuccess,
    /// The server answered with a non-2xx code.
    Failure,
    /// No usable answer: the transport failed or the body could not be read.
    NetworkError,
}

impl Outcome {
    /// Classifies an answer that did arrive. The HTTP range wins over the envelope code.
    pub fn classify(http_code: u16, envelope_code: Option<u32>) -> Self {
        if !(200..300).contains(&http_code) {
            return Outcome::Failure;
        }

        match envelope_code {
            Some(codes::MIXED_STATUS) => Outcome::MixedSuccess,
            _ => Outcome::Successful,
        }
    }

    /// `true` for [`Outcome::Successful`] and [`Outcome::MixedSuccess`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Successful | Outcome::MixedSuccess)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Successful => "successful",
            Outcome::MixedSuccess => "mixed success",
            Outcome::Failure => "failure",
            Outcome::NetworkError => "network error",
        };
        f.write_str(label)
    }
}
