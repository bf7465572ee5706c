mod analysis;
mod attachments;
mod chat;
mod chat_stream;
mod error;
mod health;
mod sentiment;
mod sessions;

pub use analysis::{
    AnalysisResponse, analysis_handler, clear_session_analysis_handler,
    get_session_analysis_handler, session_analysis_handler,
};
pub use attachments::{FileData, build_attachments};
pub use chat::{ChatRequest, ChatResponse, MessageDto, chat_handler};
pub use chat_stream::{StreamChatRequest, chat_stream_handler};
pub use error::ErrorResponse;
pub use health::health_handler;
pub use sentiment::sentiment_handler;
pub use sessions::{
    clear_messages_handler, create_session_handler, delete_session_handler, list_messages_handler,
    send_message_handler,
};
