//! Configuration management
//!
//! Settings are read in this order of precedence:
//! 1. Environment variables
//! 2. `clipvox.toml` in the working directory
//! 3. Defaults
//!
//! `${VAR_NAME}` inside the TOML file is expanded from the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Config file looked up by [`Config::load`]
pub const CONFIG_FILE: &str = "clipvox.toml";

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude API
    Claude,
    /// OpenAI-compatible chat completions API
    #[default]
    OpenAi,
}

impl LlmProvider {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "claude" | "anthropic" => Self::Claude,
            _ => Self::OpenAi,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::default(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Google Cloud Text-to-Speech settings
///
/// When neither credential field is set the ambient default credentials
/// (`GOOGLE_APPLICATION_CREDENTIALS`, gcloud, metadata server) are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TtsSettings {
    /// Service account JSON, inline
    #[serde(default, skip_serializing)]
    pub credentials_json: Option<String>,

    /// Service account JSON, base64-encoded
    #[serde(default, skip_serializing)]
    pub credentials_base64: Option<String>,

    /// Override for the synthesize endpoint
    pub endpoint: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; permissive when unset
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: None,
        }
    }
}

fn default_port() -> u16 {
    3000
}

/// Main configuration for ClipVox
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Text generation provider
    #[serde(default)]
    pub llm: LlmConfig,

    /// Speech synthesis provider
    #[serde(default)]
    pub tts: TtsSettings,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Expand `${VAR_NAME}` references from the environment.
    ///
    /// Unknown variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                while let Some(c) = chars.next() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut cfg: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;

        Ok(cfg)
    }

    /// Load from `clipvox.toml` when present, otherwise from the environment only.
    pub fn load() -> crate::Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();
        cfg.apply_overrides(lookup);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Overwrite fields with any non-empty variables found by `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = var("LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.llm.api_key = api_key;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = var("LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&provider);
        }
        if let Some(base_url) = var("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        if let Some(json) = var("GOOGLE_TTS_CREDENTIALS_JSON") {
            self.tts.credentials_json = Some(json);
        }
        if let Some(encoded) = var("GOOGLE_TTS_CREDENTIALS_BASE64") {
            self.tts.credentials_base64 = Some(encoded);
        }
        if let Some(endpoint) = var("TTS_ENDPOINT") {
            self.tts.endpoint = Some(endpoint);
        }

        if let Some(port) = var("PORT") {
            if let Ok(p) = port.trim().parse() {
                self.server.port = p;
            }
        }
        if let Some(origins) = var("ALLOWED_ORIGINS") {
            self.server.allowed_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(Error::Config(
                "LLM_API_KEY or OPENAI_API_KEY not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_llm_provider_default() {
        assert_eq!(LlmProvider::default(), LlmProvider::OpenAi);
    }

    #[test]
    fn test_llm_provider_parse() {
        assert_eq!(LlmProvider::parse("Claude"), LlmProvider::Claude);
        assert_eq!(LlmProvider::parse("anthropic"), LlmProvider::Claude);
        assert_eq!(LlmProvider::parse("openai"), LlmProvider::OpenAi);
        assert_eq!(LlmProvider::parse("something-else"), LlmProvider::OpenAi);
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.allowed_origins.is_none());
    }

    #[test]
    fn test_from_vars_requires_api_key() {
        let err = Config::from_vars(lookup(&[("PORT", "8080")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_vars_blank_api_key_is_missing() {
        assert!(Config::from_vars(lookup(&[("OPENAI_API_KEY", "   ")])).is_err());
    }

    #[test]
    fn test_from_vars_reads_everything() {
        let config = Config::from_vars(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_MODEL", "gpt-4o"),
            ("LLM_PROVIDER", "claude"),
            ("GOOGLE_TTS_CREDENTIALS_BASE64", "e30="),
            ("PORT", "8080"),
            ("ALLOWED_ORIGINS", "http://localhost:5173, https://clipvox.app"),
        ]))
        .unwrap();

        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.provider, LlmProvider::Claude);
        assert_eq!(config.tts.credentials_base64.as_deref(), Some("e30="));
        assert!(config.tts.credentials_json.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.allowed_origins,
            Some(vec![
                "http://localhost:5173".to_string(),
                "https://clipvox.app".to_string()
            ])
        );
    }

    #[test]
    fn test_llm_api_key_wins_over_openai_key() {
        let config = Config::from_vars(lookup(&[
            ("LLM_API_KEY", "primary"),
            ("OPENAI_API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(config.llm.api_key, "primary");
    }

    #[test]
    fn test_invalid_port_keeps_default() {
        let config =
            Config::from_vars(lookup(&[("OPENAI_API_KEY", "k"), ("PORT", "not-a-port")])).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("CLIPVOX_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${CLIPVOX_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${CLIPVOX_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("CLIPVOX_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("cost: $5"), "cost: $5");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[llm]
api_key = "toml-key"
model = "gpt-4.1-mini"

[tts]
endpoint = "http://localhost:9999/v1/text:synthesize"

[server]
port = 4000
"#
        )
        .unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(
            config.tts.endpoint.as_deref(),
            Some("http://localhost:9999/v1/text:synthesize")
        );
    }
}
