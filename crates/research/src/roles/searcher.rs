//! Searcher role: one search term → a short synthesis.
//!
//! Uses a search-capable model with hosted web search.

use async_trait::async_trait;
use parley_core::provider::{Provider, SearchContextSize, WebSearchOptions};
use std::sync::Arc;
use crate::error::ResearchError;
use crate::model::SearchItem;
use crate::prompts;
use super::{RoleAgent, Searcher};

pub struct LlmSearcher {
    agent: RoleAgent,
    context_size: SearchContextSize,
}

impl LlmSearcher {
    pub fn new(
        provider: Arc<dyn Provider>,
        search_model: impl Into<String>,
        context_size: SearchContextSize,
    ) -> Self {
        Self {
            agent: RoleAgent::new("searcher", provider, search_model, prompts::SEARCHER_INSTRUCTIONS),
            context_size,
        }
    }
}

#[async_trait]
impl Searcher for LlmSearcher {
    async fn search(&self, item: &SearchItem) -> Result<String, ResearchError> {
        let options = WebSearchOptions {
            search_context_size: self.context_size,
        };
        self.agent
            .complete_text(&prompts::search_prompt(item), Some(options))
            .await
    }
}
