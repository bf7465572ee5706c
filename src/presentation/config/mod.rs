mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    API_KEY_FALLBACK_VARS, AnalysisSettings, LlmSettings, LoggingSettings, ServerSettings,
    SessionSettings, Settings, UploadSettings,
};
