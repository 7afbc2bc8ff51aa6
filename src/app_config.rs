use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::writer::FileFormat;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language (ISO code or plain language name)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Source document to translate
    #[serde(default = "default_book")]
    pub book: String,

    /// Output format name, e.g. "pdf" or "markdown"
    #[serde(default = "default_file_format")]
    pub file_format: String,

    /// Explicit output path; derived from the book path when absent
    #[serde(default)]
    pub output_file: Option<String>,

    /// Translate only the first N pages
    #[serde(default)]
    pub pages: Option<usize>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Output rendering config
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: ChatGLM served locally over HTTP
    ChatGlm,
    // @provider: OpenAI
    #[default]
    OpenAI,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::ChatGlm => "ChatGLM",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::ChatGlm => "chatglm".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chatglm" | "glm" | "glmmodel" => Ok(Self::ChatGlm),
            "openai" | "openaimodel" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::ChatGlm => Self {
                provider_type: "chatglm".to_string(),
                model: default_chatglm_model(),
                api_key: String::new(),
                endpoint: default_chatglm_endpoint(),
                timeout_secs: default_chatglm_timeout_secs(),
            },
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Total attempts per request for providers that retry
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait after a rate-limited response, in seconds
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: u64,

    /// Base backoff for transient failures (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token limit for legacy completion models
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Maximum number of requests in flight; the provider's profile decides when absent
    #[serde(default)]
    pub concurrent_requests: Option<usize>,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            concurrent_requests: None,
        }
    }
}

impl TranslationCommonConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs(self.rate_limit_delay_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Output rendering settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// TrueType font embedded in PDF output; required for CJK text
    #[serde(default)]
    pub font_path: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_book() -> String {
    "tests/test.pdf".to_string()
}

fn default_file_format() -> String {
    "markdown".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_chatglm_timeout_secs() -> u64 {
    300 // local models can be slow on long pages
}

fn default_max_attempts() -> u32 {
    3
}

fn default_rate_limit_delay_secs() -> u64 {
    60
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_chatglm_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chatglm_model() -> String {
    "chatglm2-6b".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Config {
    /// Load a config file, writing the default config there first if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config
                .save(path)
                .with_context(|| format!("Failed to write default config to {}", path.display()))?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save the config as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }

        self.file_format.parse::<FileFormat>()?;

        if self.pages == Some(0) {
            return Err(anyhow!("Page limit must be at least 1"));
        }

        let common = &self.translation.common;
        if common.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be at least 1"));
        }
        if common.concurrent_requests == Some(0) {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }

        let endpoint = self.translation.get_endpoint();
        Url::parse(&endpoint).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;

        if self.translation.provider == TranslationProvider::OpenAI && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for OpenAI provider (config or OPENAI_API_KEY)"
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            book: default_book(),
            file_format: default_file_format(),
            output_file: None,
            pages: None,
            translation: TranslationConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to a provider entry, created with defaults if missing
    pub fn provider_config_mut(&mut self, provider: TranslationProvider) -> &mut ProviderConfig {
        let provider_str = provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        self.provider_config_mut(self.provider)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::ChatGlm => default_chatglm_model(),
            TranslationProvider::OpenAI => default_openai_model(),
        }
    }

    /// Get the API key for the active provider, falling back to `OPENAI_API_KEY` for OpenAI
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            TranslationProvider::ChatGlm => String::new(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::ChatGlm => default_chatglm_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout(&self) -> Duration {
        let secs = self
            .get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(|| match self.provider {
                TranslationProvider::ChatGlm => default_chatglm_timeout_secs(),
                TranslationProvider::OpenAI => default_timeout_secs(),
            });
        Duration::from_secs(secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::ChatGlm),
                ProviderConfig::new(TranslationProvider::OpenAI),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
