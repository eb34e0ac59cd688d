use thiserror::Error;

/// Failure to turn a provider timestamp string into a UTC instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized observation timestamp '{input}'")]
pub struct TimestampError {
    pub input: String,
}

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to reach weather provider: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Weather provider error {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("Failed to parse weather provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing current weather in response")]
    MissingCurrentWeather,

    #[error("Missing observation timestamp")]
    MissingTimestamp,

    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),
}

impl ProviderError {
    /// HTTP status returned by the provider, if the failure was a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(": {d}"),
        _ => String::new(),
    }
}
