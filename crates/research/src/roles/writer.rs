//! Writer role: query + summaries → report.

use async_trait::async_trait;
use parley_core::provider::Provider;
use std::sync::Arc;
use tracing::info;
use crate::error::ResearchError;
use crate::model::ReportData;
use crate::prompts;
use super::{RoleAgent, Writer};

pub struct LlmWriter {
    agent: RoleAgent,
}

impl LlmWriter {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            agent: RoleAgent::new("writer", provider, model, prompts::WRITER_INSTRUCTIONS),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.agent = self.agent.with_temperature(temperature);
        self
    }
}

#[async_trait]
impl Writer for LlmWriter {
    async fn write(&self, query: &str, search_results: &[String]) -> Result<ReportData, ResearchError> {
        let report: ReportData = self
            .agent
            .structured(&prompts::writer_prompt(query, search_results))
            .await?;
        info!(
            report_len = report.markdown_report.len(),
            follow_ups = report.follow_up_questions.len(),
            "Report written"
        );
        Ok(report)
    }
}
