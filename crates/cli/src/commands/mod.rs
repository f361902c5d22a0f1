pub mod chat;
pub mod gateway;
pub mod onboard;
pub mod research;

use anyhow::{Context, bail};
use parley_config::AppConfig;
use parley_core::provider::Provider;
use std::sync::Arc;

/// Load config and fail early, with setup hints, when no key is set.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load().context("Failed to load config")?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in .env):");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!("    PARLEY_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    }

    Ok(config)
}

pub fn provider(config: &AppConfig) -> anyhow::Result<Arc<dyn Provider>> {
    parley_providers::build_from_config(config)
        .primary()
        .context("No usable provider configured")
}
