//! Configuration loading, validation, and management for parley.
//!
//! Loads configuration from `~/.parley/config.toml`, then a `.env` file in
//! the working directory, then environment variable overrides. Validates all
//! settings at startup.

use parley_core::delivery::DeliveryPolicy;
use parley_core::persona::PersonaSources;
use parley_core::provider::SearchContextSize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model for chat and the planner / writer / mailer roles
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature; unset leaves it to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<f32>,

    /// Max tokens per LLM response; unset leaves it to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Persona documents for the chatbot
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Chat tool loop settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Research pipeline settings
    #[serde(default)]
    pub research: ResearchConfig,

    /// Push notification sink
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Outbound mail sink
    #[serde(default)]
    pub mail: MailConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}

/// Reads an optional string, treating a blank value as unset.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("providers", &self.providers)
            .field("persona", &self.persona)
            .field("chat", &self.chat)
            .field("research", &self.research)
            .field("notify", &self.notify)
            .field("mail", &self.mail)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// The name the assistant speaks as
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// Free-form text summary of the person
    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,

    /// PDF profile export
    #[serde(default = "default_profile_pdf_path")]
    pub profile_pdf_path: PathBuf,

    /// Override the system prompt entirely (skips document loading)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

fn default_persona_name() -> String {
    "your name".into()
}
fn default_summary_path() -> PathBuf {
    PathBuf::from("summary.txt")
}
fn default_profile_pdf_path() -> PathBuf {
    PathBuf::from("linkedin.pdf")
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            summary_path: default_summary_path(),
            profile_pdf_path: default_profile_pdf_path(),
            system_prompt_override: None,
        }
    }
}

impl PersonaConfig {
    pub fn sources(&self) -> PersonaSources {
        PersonaSources {
            name: self.name.clone(),
            summary_path: Some(self.summary_path.clone()),
            profile_pdf_path: Some(self.profile_pdf_path.clone()),
            system_prompt_override: self.system_prompt_override.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model round-trips allowed per user turn before giving up
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

fn default_max_tool_rounds() -> u32 {
    25
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// How many searches the planner is asked for
    #[serde(default = "default_how_many_searches")]
    pub how_many_searches: usize,

    /// Searches allowed in flight at once
    #[serde(default = "default_max_parallel_searches")]
    pub max_parallel_searches: usize,

    /// Search-capable model used by the searcher role
    #[serde(default = "default_search_model")]
    pub search_model: String,

    /// Hosted search context size
    #[serde(default)]
    pub search_context_size: SearchContextSize,

    /// Per-search timeout; a search that runs over counts as failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_timeout_secs: Option<u64>,

    /// Prefix for the trace link emitted first on the progress stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_url_prefix: Option<String>,
}

fn default_how_many_searches() -> usize {
    5
}
fn default_max_parallel_searches() -> usize {
    5
}
fn default_search_model() -> String {
    "gpt-4o-mini-search-preview".into()
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            how_many_searches: default_how_many_searches(),
            max_parallel_searches: default_max_parallel_searches(),
            search_model: default_search_model(),
            search_context_size: SearchContextSize::Low,
            search_timeout_secs: None,
            trace_url_prefix: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub pushover_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub pushover_user: Option<String>,

    #[serde(default = "default_pushover_url")]
    pub api_url: String,

    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_absorb")]
    pub on_failure: DeliveryPolicy,
}

fn default_pushover_url() -> String {
    "https://api.pushover.net/1/messages.json".into()
}
fn default_notify_timeout() -> u64 {
    10
}
fn default_absorb() -> DeliveryPolicy {
    DeliveryPolicy::Absorb
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            pushover_token: None,
            pushover_user: None,
            api_url: default_pushover_url(),
            timeout_secs: default_notify_timeout(),
            on_failure: default_absorb(),
        }
    }
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("pushover_token", &redact(&self.pushover_token))
            .field("pushover_user", &redact(&self.pushover_user))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub sendgrid_api_key: Option<String>,

    #[serde(default = "default_sendgrid_url")]
    pub api_url: String,

    /// Verified sender address
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub from: Option<String>,

    /// Report recipient
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub to: Option<String>,

    #[serde(default = "default_propagate")]
    pub on_failure: DeliveryPolicy,
}

fn default_sendgrid_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".into()
}
fn default_propagate() -> DeliveryPolicy {
    DeliveryPolicy::Propagate
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sendgrid_api_key: None,
            api_url: default_sendgrid_url(),
            from: None,
            to: None,
            on_failure: default_propagate(),
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("sendgrid_api_key", &redact(&self.sendgrid_api_key))
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    42618
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// A `.env` file in the working directory is read first, then these
    /// environment variables fill in or override settings:
    /// - `PARLEY_API_KEY`, `OPENAI_API_KEY` (when no key is configured)
    /// - `PARLEY_PROVIDER`, `PARLEY_MODEL`, `PARLEY_PERSONA_NAME`
    /// - `PUSHOVER_TOKEN`, `PUSHOVER_USER`
    /// - `SENDGRID_API_KEY`, `PARLEY_MAIL_FROM`, `PARLEY_MAIL_TO`
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
        }

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill in settings from the environment. `lookup` returns a variable's
    /// value; a variable set to an empty string counts as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = lookup("PARLEY_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(provider) = lookup("PARLEY_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("PARLEY_MODEL") {
            self.default_model = model;
        }
        if let Some(name) = lookup("PARLEY_PERSONA_NAME") {
            self.persona.name = name;
        }

        fill(&mut self.notify.pushover_token, lookup("PUSHOVER_TOKEN"));
        fill(&mut self.notify.pushover_user, lookup("PUSHOVER_USER"));
        fill(&mut self.mail.sendgrid_api_key, lookup("SENDGRID_API_KEY"));
        fill(&mut self.mail.from, lookup("PARLEY_MAIL_FROM"));
        fill(&mut self.mail.to, lookup("PARLEY_MAIL_TO"));
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.default_temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "default_temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.chat.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "chat.max_tool_rounds must be at least 1".into(),
            ));
        }

        if self.research.max_parallel_searches == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_parallel_searches must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());
        present(&self.api_key)
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| present(&p.api_key))
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: None,
            default_max_tokens: None,
            providers: HashMap::new(),
            persona: PersonaConfig::default(),
            chat: ChatConfig::default(),
            research: ResearchConfig::default(),
            notify: NotifyConfig::default(),
            mail: MailConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
