use colored::*;
use serde::Serialize;
use vizier_core::{
    client::ConnectError,
    config::ConfigError,
    request::RequestError,
    response::ApiResponse,
    status::Outcome,
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl<T: Serialize> From<&ApiResponse<T>> for FormattedString {
    fn from(response: &ApiResponse<T>) -> Self {
        let label = match response.outcome() {
            Outcome::Successful => "Success".green().bold(),
            Outcome::MixedSuccess => "Mixed Success".yellow().bold(),
            Outcome::Failure => "API Failure".red().bold(),
            Outcome::NetworkError => "Network Error".red().bold(),
        };

        let mut out = label.to_string();
        if let Some(code) = response.http_code() {
            out.push_str(&format!(" http={code}"));
        }
        if let Some(status) = response.status() {
            out.push_str(&format!(" {}", status.to_string().as_str().dimmed()));
        }
        if let Some(reason) = response.failure_reason() {
            out.push_str(&format!("\n\n'{reason}'"));
        }

        match response.outcome() {
            Outcome::Successful | Outcome::MixedSuccess => {
                let payload = serde_json::to_string_pretty(response.get())
                    .unwrap_or_else(|e| format!("<unprintable payload: {e}>"));
                out.push_str(&format!("\n\n{payload}"));
            }
            Outcome::Failure | Outcome::NetworkError if !response.raw_body().is_empty() => {
                out.push_str(&format!("\n\n{}", pretty_body(response.raw_body())));
            }
            _ => {}
        }

        FormattedString(out)
    }
}

// Bodies of failed calls are not always JSON.
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

impl From<RequestError> for FormattedString {
    fn from(err: RequestError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Invalid Request:".red().bold(), err))
    }
}

impl From<ConnectError> for FormattedString {
    fn from(err: ConnectError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl From<ConfigError> for FormattedString {
    fn from(err: ConfigError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Configuration Error:".red().bold(), err))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Failed:".red().bold(), err))
    }
}
