//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level Barista configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<OrdersConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// Directory completed orders are written to (default: `~/.barista/orders`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Replaces the built-in barista instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// First thing said to a new customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

// --- External voice pipeline ---
//
// None of these services run in-process. The settings are handed to the
// hosting voice platform and reported by `barista status`.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub stt: SttConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub tts: TtsConfig,

    /// End-of-turn model (default: "multilingual").
    #[serde(default = "default_turn_detection")]
    pub turn_detection: String,

    /// Voice activity detector (default: "silero").
    #[serde(default = "default_vad")]
    pub vad: String,

    #[serde(default)]
    pub noise_cancellation: NoiseCancellation,

    /// Let the LLM start answering before the end of turn is confirmed.
    #[serde(default = "default_true")]
    pub preemptive_generation: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stt: SttConfig::default(),
            llm: LlmConfig::default(),
            tts: TtsConfig::default(),
            turn_detection: default_turn_detection(),
            vad: default_vad(),
            noise_cancellation: NoiseCancellation::default(),
            preemptive_generation: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_turn_detection() -> String {
    "multilingual".into()
}

fn default_vad() -> String {
    "silero".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseCancellation {
    Off,
    #[default]
    Bvc,
    /// Tuned for telephony audio.
    BvcTelephony,
}

/// Speech-to-text configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    #[serde(default = "default_stt_provider")]
    pub provider: String,

    #[serde(default = "default_stt_model")]
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: default_stt_provider(),
            model: default_stt_model(),
            api_key: None,
            api_key_env: Some("DEEPGRAM_API_KEY".into()),
        }
    }
}

fn default_stt_provider() -> String {
    "deepgram".into()
}

fn default_stt_model() -> String {
    "nova-3".into()
}

impl SttConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            temperature: None,
            api_key: None,
            api_key_env: Some("GOOGLE_API_KEY".into()),
        }
    }
}

fn default_llm_provider() -> String {
    "google".into()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".into()
}

impl LlmConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_tts_provider")]
    pub provider: String,

    #[serde(default = "default_tts_voice")]
    pub voice: String,

    /// Speaking style (default: "Conversation").
    #[serde(default = "default_tts_style")]
    pub style: String,

    /// Shortest sentence the tokenizer will hand to the synthesizer.
    #[serde(default = "default_min_sentence_len")]
    pub min_sentence_len: usize,

    #[serde(default = "default_true")]
    pub text_pacing: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: default_tts_provider(),
            voice: default_tts_voice(),
            style: default_tts_style(),
            min_sentence_len: default_min_sentence_len(),
            text_pacing: true,
            api_key: None,
            api_key_env: Some("MURF_API_KEY".into()),
        }
    }
}

fn default_tts_provider() -> String {
    "murf".into()
}

fn default_tts_voice() -> String {
    "en-US-matthew".into()
}

fn default_tts_style() -> String {
    "Conversation".into()
}

fn default_min_sentence_len() -> usize {
    2
}

impl TtsConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret_field(&self.api_key, &self.api_key_env)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "barista_core=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> crate::error::Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| crate::error::BaristaError::Config(e.to_string()))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> crate::error::Result<Self> {
        let substituted = substitute_env_vars(raw)?;
        json5::from_str(&substituted)
            .map_err(|e| crate::error::BaristaError::Config(e.to_string()))
    }

    /// Default config file path: `~/.barista/config.json`
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Resolve the orders directory, expanding `~`.
    pub fn orders_dir(&self) -> PathBuf {
        self.orders
            .as_ref()
            .and_then(|o| o.dir.as_ref())
            .map(|d| PathBuf::from(shellexpand::tilde(d).as_ref()))
            .unwrap_or_else(crate::order_store::JsonOrderStore::default_path)
    }

    /// Effective pipeline settings (defaults when the section is absent).
    pub fn pipeline(&self) -> PipelineConfig {
        self.pipeline.clone().unwrap_or_default()
    }

    pub fn instructions_override(&self) -> Option<&str> {
        self.agent.as_ref().and_then(|a| a.instructions.as_deref())
    }

    pub fn greeting(&self) -> &str {
        self.agent
            .as_ref()
            .and_then(|a| a.greeting.as_deref())
            .unwrap_or("Hi there, welcome in! What can I get started for you today?")
    }

    /// Get a config value by dotted path (e.g. "pipeline.tts.voice").
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let pipeline = self.pipeline();
        let keys = [
            ("speech-to-text", &pipeline.stt.provider, pipeline.stt.resolve_api_key()),
            ("language model", &pipeline.llm.provider, pipeline.llm.resolve_api_key()),
            ("text-to-speech", &pipeline.tts.provider, pipeline.tts.resolve_api_key()),
        ];
        for (service, provider, key) in keys {
            if key.is_none() {
                warnings.push(format!(
                    "{service} provider '{provider}' has no API key configured"
                ));
            }
        }

        if pipeline.tts.min_sentence_len == 0 {
            errors.push("pipeline.tts.min_sentence_len must be at least 1".to_string());
        }

        let orders_dir = self.orders_dir();
        if orders_dir.exists() && !orders_dir.is_dir() {
            errors.push(format!(
                "Orders path is not a directory: {}",
                orders_dir.display()
            ));
        }

        (warnings, errors)
    }
}

/// Base directory for Barista data: `~/.barista/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".barista")
}
