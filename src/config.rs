//! Generation settings and startup configuration.
//!
//! `GenerationConfig` is what the sidebar edits and what every completion
//! request is built from. `AppConfig` seeds it from the environment once at
//! startup (after `.env` has been loaded by the binary):
//!
//! - `GROQ_API_KEY`: prefills the credential field (kept in memory only)
//! - `GROQ_BASE_URL`: overrides the OpenAI-compatible endpoint root
//! - `GROQ_MODEL`, `GROQ_TEMPERATURE`, `GROQ_MAX_TOKENS`: initial values

use crate::error::{ChatError, ChatResult, ConfigError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 4000;
pub const MAX_TOKENS_STEP: u32 = 100;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Models offered in the sidebar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33Versatile,
    #[serde(rename = "llama-3.1-70b-versatile")]
    Llama31Versatile,
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [
        ModelId::Llama33Versatile,
        ModelId::Llama31Versatile,
        ModelId::Mixtral8x7b,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Llama33Versatile => "llama-3.3-70b-versatile",
            ModelId::Llama31Versatile => "llama-3.1-70b-versatile",
            ModelId::Mixtral8x7b => "mixtral-8x7b-32768",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ModelId::ALL
            .into_iter()
            .find(|model| model.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownModel(wanted.to_string()))
    }
}

/// API key typed by the user. Never printed, never written anywhere.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Whitespace-only input counts as missing.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The secret as it was typed, for the input field.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The secret as it goes on the wire.
    pub fn expose(&self) -> &str {
        self.0.trim()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    pub model: ModelId,
    pub temperature: f32,
    pub max_tokens: u32,
    pub credential: Credential,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            credential: Credential::default(),
        }
    }
}

impl GenerationConfig {
    /// Checks the credential first, then the ranges.
    pub fn validate(&self) -> ChatResult<()> {
        if self.credential.is_empty() {
            return Err(ChatError::MissingCredential);
        }
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature).into());
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(ConfigError::MaxTokens(self.max_tokens).into());
        }
        Ok(())
    }

    /// Slider input: clamped and snapped to one decimal.
    pub fn set_temperature(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        let clamped = value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let snapped = (clamped / TEMPERATURE_STEP).round() * TEMPERATURE_STEP;
        self.temperature = snapped.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    }

    pub fn set_max_tokens(&mut self, value: u32) {
        self.max_tokens = value.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub generation: GenerationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparseable or out-of-range
    /// values are logged and replaced by defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();

        if let Some(url) = lookup("GROQ_BASE_URL").filter(|url| !url.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(key) = lookup("GROQ_API_KEY") {
            config.generation.credential = Credential::new(key);
        }

        if let Some(raw) = lookup("GROQ_MODEL") {
            match raw.parse::<ModelId>() {
                Ok(model) => config.generation.model = model,
                Err(err) => tracing::warn!(%err, "ignoring GROQ_MODEL"),
            }
        }

        if let Some(raw) = lookup("GROQ_TEMPERATURE") {
            match raw.trim().parse::<f32>() {
                Ok(value) if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) => {
                    config.generation.temperature = value;
                }
                _ => tracing::warn!(value = %raw, "ignoring GROQ_TEMPERATURE"),
            }
        }

        if let Some(raw) = lookup("GROQ_MAX_TOKENS") {
            match raw.trim().parse::<u32>() {
                Ok(value) if (MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&value) => {
                    config.generation.max_tokens = value;
                }
                _ => tracing::warn!(value = %raw, "ignoring GROQ_MAX_TOKENS"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> GenerationConfig {
        GenerationConfig {
            credential: Credential::new("gsk_test"),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn defaults_match_sidebar() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, ModelId::Llama33Versatile);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1024);
        assert!(config.credential.is_empty());
    }

    #[test]
    fn model_ids_parse_and_display() {
        for model in ModelId::ALL {
            assert_eq!(model.as_str().parse::<ModelId>(), Ok(model));
        }
        assert_eq!(
            "gpt-4".parse::<ModelId>(),
            Err(ConfigError::UnknownModel("gpt-4".into()))
        );
        assert_eq!(
            serde_json::to_value(ModelId::Mixtral8x7b).unwrap(),
            serde_json::json!("mixtral-8x7b-32768")
        );
    }

    #[test]
    fn empty_or_blank_credential_is_missing() {
        let mut config = GenerationConfig::default();
        assert_eq!(config.validate(), Err(ChatError::MissingCredential));
        config.credential = Credential::new("   ");
        assert_eq!(config.validate(), Err(ChatError::MissingCredential));
    }

    #[test]
    fn credential_is_checked_before_ranges() {
        let config = GenerationConfig {
            temperature: 3.0,
            ..GenerationConfig::default()
        };
        assert_eq!(config.validate(), Err(ChatError::MissingCredential));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let mut config = valid();
        assert_eq!(config.validate(), Ok(()));

        config.temperature = 1.5;
        assert_eq!(
            config.validate(),
            Err(ChatError::InvalidConfig(ConfigError::Temperature(1.5)))
        );

        config.temperature = f32::NAN;
        assert!(config.validate().is_err());

        config.temperature = 0.0;
        config.max_tokens = 99;
        assert_eq!(
            config.validate(),
            Err(ChatError::InvalidConfig(ConfigError::MaxTokens(99)))
        );

        config.max_tokens = 4000;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn slider_setters_clamp() {
        let mut config = valid();
        config.set_temperature(1.7);
        assert!((config.temperature - 1.0).abs() < 1e-6);
        config.set_temperature(0.34);
        assert!((config.temperature - 0.3).abs() < 1e-6);
        config.set_max_tokens(10);
        assert_eq!(config.max_tokens, 100);
        config.set_max_tokens(9000);
        assert_eq!(config.max_tokens, 4000);
    }

    #[test]
    fn credential_keeps_typed_text_and_trims_on_the_wire() {
        let credential = Credential::new(" gsk_key ");
        assert_eq!(credential.as_str(), " gsk_key ");
        assert_eq!(credential.expose(), "gsk_key");
    }

    #[test]
    fn credential_debug_is_redacted() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("gsk_test"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn app_config_reads_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GROQ_BASE_URL", "http://localhost:9000/v1/"),
            ("GROQ_API_KEY", "gsk_env"),
            ("GROQ_MODEL", "mixtral-8x7b-32768"),
            ("GROQ_TEMPERATURE", "0.2"),
            ("GROQ_MAX_TOKENS", "2048"),
        ]);
        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.generation.credential.expose(), "gsk_env");
        assert_eq!(config.generation.model, ModelId::Mixtral8x7b);
        assert_eq!(config.generation.temperature, 0.2);
        assert_eq!(config.generation.max_tokens, 2048);
    }

    #[test]
    fn app_config_ignores_invalid_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GROQ_MODEL", "unknown"),
            ("GROQ_TEMPERATURE", "hot"),
            ("GROQ_MAX_TOKENS", "50000"),
        ]);
        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config, AppConfig::default());
    }
}
