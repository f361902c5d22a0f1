//! Role adapters: the four stages' view of the reasoning service.
//!
//! The pipeline only depends on the [`Planner`], [`Searcher`], [`Writer`]
//! and [`Mailer`] traits. The `Llm*` implementations configure a
//! [`RoleAgent`] (instructions + expected output shape) per stage.

pub mod mailer;
pub mod planner;
pub mod searcher;
pub mod writer;

pub use mailer::LlmMailer;
pub use planner::LlmPlanner;
pub use searcher::LlmSearcher;
pub use writer::LlmWriter;

use async_trait::async_trait;
use parley_core::message::Message;
use parley_core::provider::{Provider, ProviderRequest, ResponseFormat, WebSearchOptions};
use std::sync::Arc;
use tracing::debug;
use crate::error::ResearchError;
use crate::model::{ReportData, SearchItem, SearchPlan, StructuredOutput};

/// Turns a query into a search plan.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, query: &str) -> Result<SearchPlan, ResearchError>;
}

/// Runs one search and summarizes what it found.
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, item: &SearchItem) -> Result<String, ResearchError>;
}

/// Writes the report from the collected summaries.
#[async_trait]
pub trait Writer: Send + Sync {
    async fn write(&self, query: &str, search_results: &[String]) -> Result<ReportData, ResearchError>;
}

/// Delivers the finished report.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, report: &ReportData) -> Result<(), ResearchError>;
}

/// A reasoning-service configuration for one role.
#[derive(Clone)]
pub struct RoleAgent {
    name: &'static str,
    provider: Arc<dyn Provider>,
    model: String,
    instructions: String,
    temperature: Option<f32>,
}

impl RoleAgent {
    pub fn new(
        name: &'static str,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name,
            provider,
            model: model.into(),
            instructions: instructions.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn request(&self, prompt: &str) -> ProviderRequest {
        ProviderRequest {
            temperature: self.temperature,
            ..ProviderRequest::new(
                self.model.clone(),
                vec![Message::system(&self.instructions), Message::user(prompt)],
            )
        }
    }

    /// Run the role and return its text answer.
    pub async fn complete_text(
        &self,
        prompt: &str,
        web_search: Option<WebSearchOptions>,
    ) -> Result<String, ResearchError> {
        let mut request = self.request(prompt);
        request.web_search = web_search;

        debug!(role = self.name, model = %self.model, "Invoking role");
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }

    /// Run the role with a strict output schema and decode the answer.
    pub async fn structured<T: StructuredOutput>(&self, prompt: &str) -> Result<T, ResearchError> {
        let mut request = self.request(prompt);
        request.response_format = Some(ResponseFormat::JsonSchema {
            name: T::NAME.into(),
            schema: T::schema(),
        });

        debug!(role = self.name, model = %self.model, output = T::NAME, "Invoking role");
        let response = self.provider.complete(request).await?;
        serde_json::from_str(strip_code_fence(&response.message.content)).map_err(|e| {
            ResearchError::MalformedOutput {
                role: self.name.into(),
                reason: e.to_string(),
            }
        })
    }
}

/// Some compatible endpoints wrap JSON in a markdown fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use parley_core::message::Role;

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[tokio::test]
    async fn structured_request_shape() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            r#"{"searches":[{"reason":"r","query":"q"}]}"#,
        ]));
        let agent = RoleAgent::new("planner", provider.clone(), "gpt-4o-mini", "plan things");

        let plan: SearchPlan = agent.structured("Query: x").await.unwrap();
        assert_eq!(plan.searches.len(), 1);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "plan things");
        assert_eq!(request.messages[1].content, "Query: x");
        assert!(request.tools.is_empty());
        match &request.response_format {
            Some(ResponseFormat::JsonSchema { name, .. }) => assert_eq!(name, "WebSearchPlan"),
            other => panic!("unexpected format: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_output_names_the_role() {
        let provider = Arc::new(ScriptedProvider::new(vec!["not json"]));
        let agent = RoleAgent::new("writer", provider, "m", "i");
        let err = agent.structured::<ReportData>("p").await.unwrap_err();
        match err {
            ResearchError::MalformedOutput { role, .. } => assert_eq!(role, "writer"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
