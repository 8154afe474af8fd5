use crate::error::{SentinelError, SentinelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for the external text-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub enabled: bool,
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_format() -> OutputFormat {
    OutputFormat::Json
}

fn default_pretty() -> bool {
    true
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: default_format(),
            pretty: default_pretty(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> SentinelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SentinelError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or fall back to defaults when the file does not exist.
    pub fn load_or_default(path: &str) -> SentinelResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file not found: {}, using defaults", path);
            Ok(Config::default())
        }
    }

    pub fn to_file(&self, path: &str) -> SentinelResult<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| SentinelError::Io {
            path: path.to_string(),
            source,
        })
    }

    pub fn validate(&self) -> SentinelResult<()> {
        if self.assistant.enabled {
            if self.assistant.timeout_seconds == 0 {
                return Err(SentinelError::Config(
                    "assistant.timeout_seconds must be greater than zero".to_string(),
                ));
            }
            if url::Url::parse(&self.assistant.endpoint).is_err() {
                return Err(SentinelError::Config(format!(
                    "assistant.endpoint is not a valid URL: {}",
                    self.assistant.endpoint
                )));
            }
        }
        Ok(())
    }
}
