//! Error types for the parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! is what a chat turn can fail with.

use thiserror::Error;

/// The top-level error type for a chat turn.
///
/// Tool and delivery failures never reach it: the tool loop turns them into
/// error descriptors for the model.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool loop safety bound ---
    #[error("Tool loop exceeded {limit} rounds without a final answer")]
    ToolRoundsExceeded { limit: u32 },
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool panicked: {0}")]
    Panicked(String),
}

impl ToolError {
    /// Stable kind name used in error descriptors handed back to the model.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExecutionFailed { .. } => "ExecutionFailed",
            Self::InvalidArguments(_) => "InvalidArguments",
            Self::Panicked(_) => "Panicked",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("Sink not configured: {0}")]
    NotConfigured(String),

    #[error("Delivery to {sink} failed: {reason}")]
    Transport { sink: String, reason: String },

    #[error("{sink} rejected the message (status: {status_code}): {body}")]
    Rejected {
        sink: String,
        status_code: u16,
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_kind_is_stable() {
        let err = ToolError::InvalidArguments("missing 'email'".into());
        assert_eq!(err.kind(), "InvalidArguments");
        assert!(err.to_string().contains("email"));

        let err = ToolError::ExecutionFailed {
            tool_name: "record_user_details".into(),
            reason: "boom".into(),
        };
        assert_eq!(err.kind(), "ExecutionFailed");

        let err = ToolError::Panicked("index out of bounds".into());
        assert_eq!(err.kind(), "Panicked");
    }

    #[test]
    fn rounds_exceeded_mentions_limit() {
        let err = Error::ToolRoundsExceeded { limit: 3 };
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn delivery_rejection_displays_status() {
        let err = DeliveryError::Rejected {
            sink: "sendgrid".into(),
            status_code: 403,
            body: "forbidden".into(),
        };
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("sendgrid"));
    }
}
