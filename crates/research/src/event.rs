//! Events on the research progress stream.

use serde::Serialize;
use crate::model::ReportData;

/// One item on the progress stream.
///
/// A successful run yields `Trace`, then `Progress` events, then exactly one
/// `Report` as the final item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    /// Correlation id for the run's server-side logs.
    Trace { trace_id: String, text: String },

    /// A human-readable status line.
    Progress { text: String },

    /// The finished report.
    Report { report: ReportData },
}

impl ResearchEvent {
    pub(crate) fn trace(trace_id: &str, url_prefix: Option<&str>) -> Self {
        let text = match url_prefix {
            Some(prefix) => format!("View trace: {prefix}{trace_id}"),
            None => format!("Trace ID: {trace_id}"),
        };
        Self::Trace {
            trace_id: trace_id.to_string(),
            text,
        }
    }

    pub(crate) fn progress(text: impl Into<String>) -> Self {
        Self::Progress { text: text.into() }
    }

    /// Event name used on the wire (SSE `event:` field).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trace { .. } => "trace",
            Self::Progress { .. } => "progress",
            Self::Report { .. } => "report",
        }
    }

    /// The text chunk shown to a reader. For a report, the markdown body.
    pub fn text(&self) -> &str {
        match self {
            Self::Trace { text, .. } | Self::Progress { text } => text,
            Self::Report { report } => &report.markdown_report,
        }
    }

    pub fn is_report(&self) -> bool {
        matches!(self, Self::Report { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_text_uses_prefix_when_set() {
        let event = ResearchEvent::trace("abc", Some("https://traces.example.com/"));
        assert_eq!(event.text(), "View trace: https://traces.example.com/abc");
        assert_eq!(ResearchEvent::trace("abc", None).text(), "Trace ID: abc");
    }

    #[test]
    fn report_text_is_markdown_body() {
        let event = ResearchEvent::Report {
            report: ReportData {
                short_summary: "s".into(),
                markdown_report: "# Title".into(),
                follow_up_questions: vec![],
            },
        };
        assert_eq!(event.text(), "# Title");
        assert_eq!(event.name(), "report");
        assert!(event.is_report());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(ResearchEvent::progress("Searching...")).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["text"], "Searching...");
    }
}
