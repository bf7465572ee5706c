mod gemini_client;

pub use gemini_client::{
    DEFAULT_BASE_URL, FILE_ONLY_PROMPT, GeminiClient, GenerationConfig, create_gemini_client,
};
