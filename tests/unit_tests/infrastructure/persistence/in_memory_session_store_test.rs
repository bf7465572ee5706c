use helpai::application::ports::{SessionStore, SessionStoreError};
use helpai::domain::{ChatMessage, Sentiment, SentimentDistribution, SentimentResult, SessionId};
use helpai::infrastructure::persistence::InMemorySessionStore;

fn result(summary: &str) -> SentimentResult {
    SentimentResult {
        sentiment: Sentiment::Positive,
        score: 0.8,
        summary: summary.to_string(),
        title: "Some Title Here".to_string(),
        topics: vec!["topic".to_string()],
        intent: vec![],
        emotion: "glad".to_string(),
        distribution: SentimentDistribution::synthesize(Sentiment::Positive, 0.8),
    }
}

#[tokio::test]
async fn given_created_session_when_appending_then_get_returns_messages_in_order() {
    let store = InMemorySessionStore::new();
    let session = store.create().await.unwrap();

    store
        .append_message(session.id, ChatMessage::user("first"))
        .await
        .unwrap();
    store
        .append_message(session.id, ChatMessage::assistant("second"))
        .await
        .unwrap();

    let loaded = store.get(session.id).await.unwrap();
    let texts: Vec<&str> = loaded.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn given_unknown_session_when_getting_then_returns_not_found() {
    let store = InMemorySessionStore::new();
    let id = SessionId::new();

    let result = store.get(id).await;

    assert!(matches!(result, Err(SessionStoreError::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn given_history_when_clearing_then_analysis_slot_is_kept() {
    let store = InMemorySessionStore::new();
    let session = store.create().await.unwrap();
    store
        .append_message(session.id, ChatMessage::user("hello"))
        .await
        .unwrap();
    let ticket = store.begin_analysis(session.id).await.unwrap();
    store
        .commit_analysis(session.id, ticket, result("kept"))
        .await
        .unwrap();

    store.clear_history(session.id).await.unwrap();

    let loaded = store.get(session.id).await.unwrap();
    assert!(loaded.messages().is_empty());
    assert_eq!(
        loaded.analysis().current().map(|r| r.summary.as_str()),
        Some("kept")
    );
}

#[tokio::test]
async fn given_overlapping_analyses_when_older_finishes_last_then_it_is_stale() {
    let store = InMemorySessionStore::new();
    let session = store.create().await.unwrap();
    let older = store.begin_analysis(session.id).await.unwrap();
    let newer = store.begin_analysis(session.id).await.unwrap();

    store
        .commit_analysis(session.id, newer, result("newer"))
        .await
        .unwrap();
    let stale = store
        .commit_analysis(session.id, older, result("older"))
        .await;

    assert!(matches!(stale, Err(SessionStoreError::StaleTicket(t)) if t == older.value()));
    let loaded = store.get(session.id).await.unwrap();
    assert_eq!(
        loaded.analysis().current().map(|r| r.summary.as_str()),
        Some("newer")
    );
}

#[tokio::test]
async fn given_cleared_analysis_when_pending_result_arrives_then_it_is_rejected() {
    let store = InMemorySessionStore::new();
    let session = store.create().await.unwrap();
    let ticket = store.begin_analysis(session.id).await.unwrap();

    store.clear_analysis(session.id).await.unwrap();
    let outcome = store
        .commit_analysis(session.id, ticket, result("late"))
        .await;

    assert!(matches!(outcome, Err(SessionStoreError::StaleTicket(_))));
    assert!(
        store
            .get(session.id)
            .await
            .unwrap()
            .analysis()
            .current()
            .is_none()
    );
}

#[tokio::test]
async fn given_existing_session_when_deleting_then_it_is_gone() {
    let store = InMemorySessionStore::new();
    let session = store.create().await.unwrap();
    store
        .append_message(session.id, ChatMessage::user("hello"))
        .await
        .unwrap();

    store.delete(session.id).await.unwrap();

    assert!(matches!(
        store.get(session.id).await,
        Err(SessionStoreError::NotFound(_))
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn given_unknown_session_when_deleting_then_returns_not_found() {
    let store = InMemorySessionStore::new();
    let id = SessionId::new();

    let result = store.delete(id).await;

    assert!(matches!(result, Err(SessionStoreError::NotFound(missing)) if missing == id));
}

#[tokio::test]
async fn given_store_at_capacity_when_creating_then_oldest_session_is_evicted() {
    let store = InMemorySessionStore::with_max_sessions(2);
    let first = store.create().await.unwrap();
    let second = store.create().await.unwrap();

    let third = store.create().await.unwrap();

    assert_eq!(store.len().await, 2);
    assert!(matches!(
        store.get(first.id).await,
        Err(SessionStoreError::NotFound(_))
    ));
    assert!(store.get(second.id).await.is_ok());
    assert!(store.get(third.id).await.is_ok());
}

#[tokio::test]
async fn given_deleted_session_when_creating_at_capacity_then_remaining_sessions_survive() {
    let store = InMemorySessionStore::with_max_sessions(2);
    let first = store.create().await.unwrap();
    let second = store.create().await.unwrap();
    store.delete(first.id).await.unwrap();

    let third = store.create().await.unwrap();

    assert_eq!(store.len().await, 2);
    assert!(store.get(second.id).await.is_ok());
    assert!(store.get(third.id).await.is_ok());
}
