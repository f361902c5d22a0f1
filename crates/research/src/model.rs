//! Research data model and the JSON schemas the roles answer with.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A type a role returns as strict JSON.
pub trait StructuredOutput: DeserializeOwned {
    /// Schema name sent with the request.
    const NAME: &'static str;

    /// Strict JSON schema: every property required, no extras.
    fn schema() -> serde_json::Value;
}

/// One planned web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Why this search advances the overall research goal
    pub reason: String,

    /// The search term to use
    pub query: String,
}

impl SearchItem {
    pub fn new(reason: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            query: query.into(),
        }
    }
}

/// The searches the planner proposed. Any length, including zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    pub searches: Vec<SearchItem>,
}

impl StructuredOutput for SearchPlan {
    const NAME: &'static str = "WebSearchPlan";

    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "searches": {
                    "type": "array",
                    "description": "The set of searches to perform.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "reason": {
                                "type": "string",
                                "description": "Why this search advances the overall research goal."
                            },
                            "query": {
                                "type": "string",
                                "description": "The search term to use for the web search."
                            }
                        },
                        "required": ["reason", "query"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["searches"],
            "additionalProperties": false
        })
    }
}

/// The written report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    /// A brief 2–3 sentence executive summary
    pub short_summary: String,

    /// The complete report in markdown
    pub markdown_report: String,

    /// Concrete next areas to explore
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

impl StructuredOutput for ReportData {
    const NAME: &'static str = "ReportData";

    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "short_summary": {
                    "type": "string",
                    "description": "A brief 2–3 sentence executive summary."
                },
                "markdown_report": {
                    "type": "string",
                    "description": "The complete report in markdown."
                },
                "follow_up_questions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Concrete next areas to explore."
                }
            },
            "required": ["short_summary", "markdown_report", "follow_up_questions"],
            "additionalProperties": false
        })
    }
}

/// The email the mailer role drafts from a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub html_body: String,
}

impl StructuredOutput for EmailDraft {
    const NAME: &'static str = "EmailDraft";

    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "subject": {
                    "type": "string",
                    "description": "An appropriate subject line for the email."
                },
                "html_body": {
                    "type": "string",
                    "description": "The report converted into clean, well presented HTML."
                }
            },
            "required": ["subject", "html_body"],
            "additionalProperties": false
        })
    }
}
