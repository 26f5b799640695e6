use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language codes (ISO)
    pub target_languages: Vec<String>,

    /// Directory containing the source HTML documents
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving one subtree per target language
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Translation config
    pub translation: TranslationConfig,

    /// Which protected-content classes to keep out of translation
    #[serde(default)]
    pub safety: SafetyConfig,

    /// SEO post-processing settings
    #[serde(default)]
    pub seo: SeoConfig,

    /// Task-level parallelism settings
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Per-language glossary: language code -> (term -> enforced translation)
    #[serde(default)]
    pub glossary: HashMap<String, HashMap<String, String>>,

    /// Whether the on-disk document cache is consulted
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
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
            "openai" => Ok(Self::OpenAI),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
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
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::LMStudio => Self {
                provider_type: "lmstudio".to_string(),
                model: default_lmstudio_model(),
                api_key: String::new(),
                endpoint: default_lmstudio_endpoint(),
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
    /// Maximum number of texts sent in one provider request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Retry attempt budget for rate-limited or malformed responses
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds
    #[serde(default = "default_retry_backoff_cap_ms")]
    pub retry_backoff_cap_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional free-form hint about the site passed along with every request
    #[serde(default = "String::new")]
    pub context_hint: String,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_cap_ms: default_retry_backoff_cap_ms(),
            temperature: default_temperature(),
            context_hint: String::new(),
        }
    }
}

/// Which markup classes are captured into the placeholder vault
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SafetyConfig {
    /// Preserve `<pre>` and `<code>` blocks verbatim
    #[serde(default = "default_true")]
    pub preserve_code_blocks: bool,

    /// Preserve `<script>` elements verbatim (JSON-LD excluded)
    #[serde(default = "default_true")]
    pub preserve_scripts: bool,

    /// Preserve `<style>` elements verbatim
    #[serde(default = "default_true")]
    pub preserve_styles: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            preserve_code_blocks: true,
            preserve_scripts: true,
            preserve_styles: true,
        }
    }
}

/// SEO post-processing settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SeoConfig {
    /// Inject alternate-language link elements into translated documents
    #[serde(default)]
    pub inject_hreflang: bool,

    /// Public base URL used to build alternate-language hrefs
    #[serde(default = "String::new")]
    pub base_url: String,
}

/// Task-level parallelism settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ParallelConfig {
    /// Maximum number of (document, language) tasks in flight
    #[serde(default = "default_parallel_limit")]
    pub limit: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            limit: default_parallel_limit(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
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
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("site")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("translated")
}

fn default_batch_size() -> usize {
    20
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_retry_backoff_cap_ms() -> u64 {
    30_000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_parallel_limit() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            anyhow!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            )
        })?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path.as_ref(), e))?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path.as_ref(), e))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for lang in &self.target_languages {
            let _name = crate::language_utils::get_language_name(lang)?;
            if lang == &self.source_language {
                return Err(anyhow!(
                    "Target language '{}' equals the source language",
                    lang
                ));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for lang in &self.target_languages {
            if !seen.insert(lang.as_str()) {
                return Err(anyhow!("Duplicate target language '{}'", lang));
            }
        }

        if self.parallel.limit == 0 {
            return Err(anyhow!("parallel.limit must be at least 1"));
        }
        if self.translation.common.batch_size == 0 {
            return Err(anyhow!("translation.common.batch_size must be at least 1"));
        }

        // Validate API key for hosted providers
        if self.translation.provider == TranslationProvider::OpenAI
            && self.translation.get_api_key().is_empty()
        {
            return Err(anyhow!(
                "Translation API key is required for OpenAI provider"
            ));
        }

        // The hreflang href template needs a parseable base URL
        if self.seo.inject_hreflang {
            url::Url::parse(&self.seo.base_url)
                .map_err(|e| anyhow!("seo.base_url is not a valid URL: {}", e))?;
        }

        Ok(())
    }

    /// Glossary entries for one target language, empty when none are configured
    pub fn glossary_for(&self, language: &str) -> HashMap<String, String> {
        self.glossary.get(language).cloned().unwrap_or_default()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_languages: vec!["es".to_string(), "fr".to_string()],
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            translation: TranslationConfig::default(),
            safety: SafetyConfig::default(),
            seo: SeoConfig::default(),
            parallel: ParallelConfig::default(),
            glossary: HashMap::new(),
            cache_enabled: true,
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        default_timeout_secs()
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: TranslationProvider::default(),
            available_providers: Vec::new(),
            common: TranslationCommonConfig::default(),
        };

        config
            .available_providers
            .push(ProviderConfig::new(TranslationProvider::OpenAI));
        config
            .available_providers
            .push(ProviderConfig::new(TranslationProvider::LMStudio));

        config
    }
}
