use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Nothing here is required: the two vendor API keys normally arrive through
/// the UI at runtime and are held in memory only. The env seeds exist so a
/// developer can skip the key form locally.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional Leonar key seed, pre-authenticates the session at startup.
    pub leonar_api_key: Option<String>,
    /// Optional Anthropic key seed, pre-authenticates the session at startup.
    pub anthropic_api_key: Option<String>,
    /// Directory for the LinkedIn daily usage counter file.
    /// Defaults to `.sourcer` under the home directory.
    pub usage_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            leonar_api_key: optional_env("LEONAR_API_KEY"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            usage_dir: optional_env("LINKEDIN_USAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_usage_dir),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating an empty string as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Quota file location when `LINKEDIN_USAGE_DIR` is unset. Containers
/// without HOME fall back to the working directory.
fn default_usage_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".sourcer"),
        None => PathBuf::from("."),
    }
}
