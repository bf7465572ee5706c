use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::DEFAULT_RESPONSE_LANGUAGE;
use crate::domain::{DEFAULT_ACCEPTED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_MB, UploadPolicy};
use crate::infrastructure::llm::DEFAULT_BASE_URL;
use crate::infrastructure::persistence::DEFAULT_MAX_SESSIONS;

use super::Environment;

/// Checked, in order, when `llm.api_key` is empty.
pub const API_KEY_FALLBACK_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub logging: LoggingSettings,
    pub analysis: AnalysisSettings,
    pub uploads: UploadSettings,
    pub sessions: SessionSettings,
}

impl Settings {
    /// Layers `appsettings.<environment>.toml` (optional) under `APP__*`
    /// environment variables, on top of the built-in defaults.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("uploads.accepted_extensions")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub request_timeout_secs: u64,
}

impl LlmSettings {
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }

        API_KEY_FALLBACK_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: "gemini-2.0-flash".to_string(),
            max_output_tokens: 1000,
            temperature: 0.7,
            top_p: 1.0,
            top_k: 40,
            request_timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub response_language: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            response_language: DEFAULT_RESPONSE_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_file_size_mb: u64,
    pub accepted_extensions: Vec<String>,
    /// Upper bound on the number of files one request body is sized for.
    pub max_files_per_request: u64,
}

impl UploadSettings {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.accepted_extensions.clone(), self.max_file_size_mb)
    }

    /// Request body limit. Base64 inflates JSON uploads by a third.
    pub fn body_limit_bytes(&self) -> usize {
        let per_file = self.max_file_size_mb * 1024 * 1024 * 4 / 3;
        (per_file * self.max_files_per_request + 1024 * 1024) as usize
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            accepted_extensions: DEFAULT_ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_files_per_request: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Oldest sessions are evicted beyond this count.
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}
