//! Connection settings for the project store and the generation service.
//!
//! Settings come from an optional TOML file and are then overridden by
//! `JOURNEYFLOW_*` environment variables:
//!
//! ```toml
//! [supabase]
//! url = "https://xyz.supabase.co"
//! anon_key = "..."
//!
//! [openai]
//! model = "gpt-4o-mini"
//! ```

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_SUPABASE_URL: &str = "JOURNEYFLOW_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "JOURNEYFLOW_SUPABASE_ANON_KEY";
pub const ENV_ACCESS_TOKEN: &str = "JOURNEYFLOW_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "JOURNEYFLOW_USER_ID";
pub const ENV_OPENAI_API_KEY: &str = "JOURNEYFLOW_OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "JOURNEYFLOW_OPENAI_MODEL";
pub const ENV_OPENAI_BASE_URL: &str = "JOURNEYFLOW_OPENAI_BASE_URL";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub supabase: SupabaseConfig,
    pub openai: GenerationConfig,
}

/// PostgREST endpoint of the project store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// Signed-in user's JWT. Falls back to the anon key when absent.
    pub access_token: Option<String>,
    /// Owner written on created projects and used to filter listings.
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    SyncError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                log::debug!("loaded config from {}", path.display());
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SUPABASE_URL) {
            self.supabase.url = v;
        }
        if let Some(v) = get(ENV_SUPABASE_ANON_KEY) {
            self.supabase.anon_key = v;
        }
        if let Some(v) = get(ENV_ACCESS_TOKEN) {
            self.supabase.access_token = Some(v);
        }
        if let Some(v) = get(ENV_USER_ID) {
            self.supabase.user_id = Some(v);
        }
        if let Some(v) = get(ENV_OPENAI_API_KEY) {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get(ENV_OPENAI_MODEL) {
            self.openai.model = v;
        }
        if let Some(v) = get(ENV_OPENAI_BASE_URL) {
            self.openai.base_url = v;
        }
    }
}

impl SupabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "backend url is not set (supabase.url or {ENV_SUPABASE_URL})"
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "backend key is not set (supabase.anon_key or {ENV_SUPABASE_ANON_KEY})"
            )));
        }
        Ok(())
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(SyncError::Config(format!(
                "generation API key is not set (openai.api_key or {ENV_OPENAI_API_KEY})"
            )));
        }
        Ok(())
    }
}
