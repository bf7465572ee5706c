use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    analysis_handler, chat_handler, chat_stream_handler, clear_messages_handler,
    clear_session_analysis_handler, create_session_handler, delete_session_handler,
    get_session_analysis_handler, health_handler, list_messages_handler, send_message_handler,
    sentiment_handler, session_analysis_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = state.settings.uploads.body_limit_bytes();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler::<L>))
        .route("/api/gemini/chat", post(chat_stream_handler::<L>))
        .route("/api/sentiment", post(sentiment_handler::<L>))
        .route("/api/analysis", post(analysis_handler::<L>))
        .route("/api/sessions", post(create_session_handler::<L>))
        .route(
            "/api/sessions/{session_id}",
            delete(delete_session_handler::<L>),
        )
        .route(
            "/api/sessions/{session_id}/messages",
            get(list_messages_handler::<L>)
                .post(send_message_handler::<L>)
                .delete(clear_messages_handler::<L>),
        )
        .route(
            "/api/sessions/{session_id}/analysis",
            get(get_session_analysis_handler::<L>)
                .post(session_analysis_handler::<L>)
                .delete(clear_session_analysis_handler::<L>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
