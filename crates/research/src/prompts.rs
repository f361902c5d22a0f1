//! Role instructions and prompt formats.

use crate::model::SearchItem;

/// Planner instructions asking for exactly `how_many` searches.
pub fn planner_instructions(how_many: usize) -> String {
    format!(
        "You are a helpful research assistant. \
         Given a user query, propose a targeted set of web searches that, when combined, \
         enable a comprehensive answer. Focus on breadth + key depth: include primary sources, \
         recent analyses, and authoritative references. \
         Return exactly {how_many} search terms."
    )
}

pub const SEARCHER_INSTRUCTIONS: &str = "You are a research assistant. Given a search term, perform a web search and produce a concise synthesis. \
Return 2–3 short paragraphs, under 300 words total. Capture core facts and signals from top sources. \
Omit filler, meta-text, and commentary. Output only the summary text.";

pub const WRITER_INSTRUCTIONS: &str = "You are a senior researcher compiling a cohesive report from a user query and summarized findings.\n\
First, design a logical outline (sections/subsections) that tells a complete story. Then write the report.\n\
The final result MUST be markdown, comprehensive, and long-form (aim ≥ 1000 words). \
Favor clarity, structure, and citations-in-text (plain text) where relevant.";

pub const MAILER_INSTRUCTIONS: &str = "You are able to send a nicely formatted HTML email based on a detailed report.\n\
You will be provided with a detailed report. Draft one email, \
providing the report converted into clean, well presented HTML with an appropriate subject line.";

pub fn plan_prompt(query: &str) -> String {
    format!("Query: {query}")
}

pub fn search_prompt(item: &SearchItem) -> String {
    format!(
        "Search term: {}\nReason for searching: {}",
        item.query, item.reason
    )
}

pub fn writer_prompt(query: &str, search_results: &[String]) -> String {
    format!("Original query: {query}\nSummarized search results: {search_results:?}")
}
