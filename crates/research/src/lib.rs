//! Deep research pipeline.
//!
//! A query goes through four roles in order: the planner proposes web
//! searches, the searcher runs them concurrently, the writer turns the
//! summaries into a markdown report, and the mailer sends it as HTML email.
//! [`ResearchManager::run`] streams progress while that happens.

pub mod error;
pub mod event;
pub mod manager;
pub mod model;
pub mod prompts;
pub mod roles;

#[cfg(test)]
mod test_support;

pub use error::ResearchError;
pub use event::ResearchEvent;
pub use manager::{DEFAULT_MAX_PARALLEL_SEARCHES, ResearchManager, ResearchSettings};
pub use model::{EmailDraft, ReportData, SearchItem, SearchPlan};
pub use roles::{LlmMailer, LlmPlanner, LlmSearcher, LlmWriter, Mailer, Planner, Searcher, Writer};
