mod chat_message;
mod chat_session;
mod document;
mod message_id;
mod message_role;
mod sentiment;
mod session_id;
mod upload_policy;

pub use chat_message::ChatMessage;
pub use chat_session::{AnalysisSlot, ChatSession, RequestTicket};
pub use document::{Document, DocumentFormat, extension_of};
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use sentiment::{MAX_TOPICS, Sentiment, SentimentDistribution, SentimentResult, limit_topics};
pub use session_id::SessionId;
pub use upload_policy::{
    DEFAULT_ACCEPTED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_MB, UploadPolicy, UploadRejection,
};
