//! Planner role: query → search plan.

use async_trait::async_trait;
use parley_core::provider::Provider;
use std::sync::Arc;
use tracing::info;
use crate::error::ResearchError;
use crate::model::SearchPlan;
use crate::prompts;
use super::{Planner, RoleAgent};

pub struct LlmPlanner {
    agent: RoleAgent,
}

impl LlmPlanner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, how_many_searches: usize) -> Self {
        Self {
            agent: RoleAgent::new(
                "planner",
                provider,
                model,
                prompts::planner_instructions(how_many_searches),
            ),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.agent = self.agent.with_temperature(temperature);
        self
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, query: &str) -> Result<SearchPlan, ResearchError> {
        let plan: SearchPlan = self.agent.structured(&prompts::plan_prompt(query)).await?;
        info!(searches = plan.searches.len(), "Searches planned");
        Ok(plan)
    }
}
