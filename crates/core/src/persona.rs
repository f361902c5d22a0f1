//! Persona: the character the chatbot plays and its system prompt.
//!
//! The persona is assembled from two documents:
//!
//! 1. **Summary**: a free-form text file describing the person
//! 2. **Profile**: a PDF export (e.g. a LinkedIn profile) whose page text is extracted
//!
//! Both sources are optional. A missing or unreadable source becomes an empty
//! section; loading never fails a request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where persona documents live.
#[derive(Debug, Clone, Default)]
pub struct PersonaSources {
    /// The name the assistant speaks as
    pub name: String,

    /// Free-form text summary
    pub summary_path: Option<PathBuf>,

    /// PDF profile to extract text from
    pub profile_pdf_path: Option<PathBuf>,

    /// Optional system prompt override (skips all file loading)
    pub system_prompt_override: Option<String>,
}

/// A loaded persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The name the assistant speaks as
    pub name: String,

    /// Summary text (empty if unavailable)
    pub summary: String,

    /// Profile text extracted from the PDF (empty if unavailable)
    pub profile: String,

    /// The assembled system instruction
    pub system_prompt: String,

    /// Which source files produced text (for diagnostics)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loaded_files: Vec<String>,
}

impl Persona {
    /// Load persona documents and assemble the system prompt.
    pub fn load(sources: &PersonaSources) -> Self {
        if let Some(override_prompt) = &sources.system_prompt_override {
            debug!("Using system prompt override, skipping persona documents");
            return Self {
                name: sources.name.clone(),
                summary: String::new(),
                profile: String::new(),
                system_prompt: override_prompt.clone(),
                loaded_files: vec!["<override>".into()],
            };
        }

        let mut loaded_files = Vec::new();

        let summary = sources
            .summary_path
            .as_deref()
            .map(read_text_file)
            .unwrap_or_default();
        if let (Some(path), false) = (&sources.summary_path, summary.is_empty()) {
            loaded_files.push(path.display().to_string());
        }

        let profile = sources
            .profile_pdf_path
            .as_deref()
            .map(read_pdf_text)
            .unwrap_or_default();
        if let (Some(path), false) = (&sources.profile_pdf_path, profile.is_empty()) {
            loaded_files.push(path.display().to_string());
        }

        let system_prompt = build_system_prompt(&sources.name, &summary, &profile);

        debug!(
            files_loaded = loaded_files.len(),
            prompt_len = system_prompt.len(),
            "Persona loaded"
        );

        Self {
            name: sources.name.clone(),
            summary,
            profile,
            system_prompt,
            loaded_files,
        }
    }

    /// Estimate the token count of the system prompt (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.system_prompt.len() / 4
    }
}

/// Assemble the persona instruction. Empty documents leave empty sections.
pub fn build_system_prompt(name: &str, summary: &str, profile: &str) -> String {
    let mut prompt = String::with_capacity(2048 + summary.len() + profile.len());
    prompt.push_str(&format!(
        "You are acting as {name}. You are answering questions on {name}'s website, \
         particularly questions related to {name}'s career, background, skills and experience. \
         Your responsibility is to represent {name} for interactions on the website as faithfully as possible. \
         You are given a summary of {name}'s background and LinkedIn profile which you can use to answer questions. \
         Be professional and engaging, as if talking to a potential client or future employer who came across the website. \
         If you don't know the answer to any question, use your record_unknown_question tool to record the question that you couldn't answer, \
         even if it's about something trivial or unrelated to career. \
         If the user is engaging in discussion, try to steer them towards getting in touch via email; \
         ask for their email and record it using your record_user_details tool.\n\n"
    ));
    prompt.push_str(&format!(
        "## Summary:\n{summary}\n\n## LinkedIn Profile:\n{profile}\n\n"
    ));
    prompt.push_str(&format!(
        "With this context, please chat with the user, always staying in character as {name}."
    ));
    prompt
}

/// Read a UTF-8 text file, returning an empty string on any error.
pub fn read_text_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Could not read persona summary");
            String::new()
        }
    }
}

/// Extract the text of a PDF, returning an empty string on any error.
///
/// The extractor can panic on malformed documents; that is treated like any
/// other read failure.
pub fn read_pdf_text(path: &Path) -> String {
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text(path));
    match extracted {
        Ok(Ok(text)) => text
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        Ok(Err(e)) => {
            warn!(file = %path.display(), error = %e, "Could not extract profile PDF text");
            String::new()
        }
        Err(_) => {
            warn!(file = %path.display(), "PDF extractor panicked, treating profile as empty");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn unreadable_sources_leave_empty_sections() {
        let sources = PersonaSources {
            name: "Ada".into(),
            summary_path: Some(PathBuf::from("/nonexistent/summary.txt")),
            profile_pdf_path: Some(PathBuf::from("/nonexistent/profile.pdf")),
            system_prompt_override: None,
        };
        let persona = Persona::load(&sources);

        assert!(persona.summary.is_empty());
        assert!(persona.profile.is_empty());
        assert!(persona.loaded_files.is_empty());
        assert!(persona
            .system_prompt
            .contains("## Summary:\n\n\n## LinkedIn Profile:\n\n\n"));
        assert!(persona.system_prompt.starts_with("You are acting as Ada."));
    }

    #[test]
    fn summary_is_inlined_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let summary = tmp.path().join("summary.txt");
        fs::write(&summary, "Engineer who likes compilers.").unwrap();

        let persona = Persona::load(&PersonaSources {
            name: "Ada".into(),
            summary_path: Some(summary.clone()),
            ..Default::default()
        });

        assert_eq!(persona.summary, "Engineer who likes compilers.");
        assert_eq!(persona.loaded_files, vec![summary.display().to_string()]);
        assert!(persona
            .system_prompt
            .contains("## Summary:\nEngineer who likes compilers.\n\n"));
        assert!(persona
            .system_prompt
            .ends_with("always staying in character as Ada."));
    }

    #[test]
    fn garbage_pdf_degrades_to_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("profile.pdf");
        fs::write(&pdf, b"definitely not a pdf").unwrap();
        assert_eq!(read_pdf_text(&pdf), "");
    }

    #[test]
    fn override_skips_documents() {
        let persona = Persona::load(&PersonaSources {
            name: "Ada".into(),
            system_prompt_override: Some("Custom prompt".into()),
            ..Default::default()
        });
        assert_eq!(persona.system_prompt, "Custom prompt");
        assert_eq!(persona.loaded_files, vec!["<override>"]);
    }

    #[test]
    fn prompt_mentions_both_tools() {
        let prompt = build_system_prompt("Ada", "", "");
        assert!(prompt.contains("record_unknown_question"));
        assert!(prompt.contains("record_user_details"));
    }
}
