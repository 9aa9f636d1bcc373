// ⚙️ Configuration - Environment-driven categorizer settings
// Binaries load `.env` first; the library only reads what it is handed.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::{CallPolicy, GeminiConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::normalizer::MatchingMode;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_API_BASE_URL: &str = "GEMINI_API_BASE_URL";
pub const ENV_MATCHING: &str = "CATEGORIZER_MATCHING";
pub const ENV_MAX_ATTEMPTS: &str = "CATEGORIZER_MAX_ATTEMPTS";
pub const ENV_BACKOFF_MS: &str = "CATEGORIZER_BACKOFF_MS";
pub const ENV_DEADLINE_MS: &str = "CATEGORIZER_DEADLINE_MS";
pub const ENV_RULES_PATH: &str = "CATEGORIZER_RULES_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizerConfig {
    /// Classifier credential; `None` means fallback-only
    pub api_key: Option<String>,

    pub model: String,

    pub api_base_url: String,

    pub matching: MatchingMode,

    pub call_policy: CallPolicy,

    /// Replaces the built-in keyword rules when set
    pub rules_path: Option<PathBuf>,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        CategorizerConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            matching: MatchingMode::default(),
            call_policy: CallPolicy::default(),
            rules_path: None,
        }
    }
}

impl CategorizerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = CategorizerConfig::default();

        let matching = match get(ENV_MATCHING) {
            Some(raw) => raw
                .parse::<MatchingMode>()
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("Invalid {}", ENV_MATCHING))?,
            None => defaults.matching,
        };

        let max_attempts = parse_number::<u32>(get(ENV_MAX_ATTEMPTS), ENV_MAX_ATTEMPTS)?
            .unwrap_or(defaults.call_policy.max_attempts);
        if max_attempts == 0 {
            return Err(anyhow!("{} must be at least 1", ENV_MAX_ATTEMPTS));
        }
        let backoff = parse_number::<u64>(get(ENV_BACKOFF_MS), ENV_BACKOFF_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.call_policy.backoff);
        let deadline = parse_number::<u64>(get(ENV_DEADLINE_MS), ENV_DEADLINE_MS)?.map(Duration::from_millis);

        Ok(CategorizerConfig {
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or(defaults.model),
            api_base_url: get(ENV_API_BASE_URL).unwrap_or(defaults.api_base_url),
            matching,
            call_policy: CallPolicy {
                max_attempts,
                backoff,
                deadline,
            },
            rules_path: get(ENV_RULES_PATH).map(PathBuf::from),
        })
    }

    /// Builder: set the credential
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Gemini settings, present only when a credential is configured.
    pub fn gemini(&self) -> Option<GeminiConfig> {
        self.api_key.as_ref().map(|api_key| GeminiConfig {
            api_key: api_key.clone(),
            model: self.model.clone(),
            base_url: self.api_base_url.clone(),
        })
    }
}

fn parse_number<T>(raw: Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|value| {
        value
            .parse::<T>()
            .with_context(|| format!("Invalid {}: '{}'", key, value))
    })
    .transpose()
}

// ============================================================================
// TESTS
// ============================================================================
