//! Research pipeline errors.

use parley_core::error::{DeliveryError, ProviderError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("{role} returned malformed output: {reason}")]
    MalformedOutput { role: String, reason: String },

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Search timed out after {0:?}")]
    SearchTimeout(Duration),

    #[error("Planning searches failed: {0}")]
    Plan(Box<ResearchError>),

    #[error("Writing the report failed: {0}")]
    Write(Box<ResearchError>),

    #[error("Delivering the report failed: {0}")]
    Deliver(Box<ResearchError>),
}

impl ResearchError {
    /// The pipeline stage that failed, for stage-level errors.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Plan(_) => Some("plan"),
            Self::Write(_) => Some("write"),
            Self::Deliver(_) => Some("deliver"),
            _ => None,
        }
    }

    pub(crate) fn plan(e: ResearchError) -> Self {
        Self::Plan(Box::new(e))
    }

    pub(crate) fn write(e: ResearchError) -> Self {
        Self::Write(Box::new(e))
    }

    pub(crate) fn deliver(e: ResearchError) -> Self {
        Self::Deliver(Box::new(e))
    }
}
