use helpai::domain::{
    AnalysisSlot, ChatMessage, ChatSession, MessageRole, Sentiment, SentimentDistribution,
    SentimentResult,
};

fn result(summary: &str) -> SentimentResult {
    SentimentResult {
        sentiment: Sentiment::Neutral,
        score: 0.5,
        summary: summary.to_string(),
        title: "Title here".to_string(),
        topics: vec![],
        intent: vec![],
        emotion: "Neutral".to_string(),
        distribution: SentimentDistribution::synthesize(Sentiment::Neutral, 0.5),
    }
}

#[test]
fn given_session_when_appending_messages_then_order_is_preserved() {
    let mut session = ChatSession::new();

    session.append(ChatMessage::user("hello"));
    session.append(ChatMessage::assistant("hi there"));

    let roles: Vec<MessageRole> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
    assert_eq!(session.messages()[1].content, "hi there");
}

#[test]
fn given_session_with_history_when_clearing_then_messages_are_empty() {
    let mut session = ChatSession::new();
    session.append(ChatMessage::user("hello"));

    session.clear_history();

    assert!(session.messages().is_empty());
}

#[test]
fn given_two_tickets_when_older_commits_last_then_it_is_discarded() {
    let mut slot = AnalysisSlot::default();
    let first = slot.issue_ticket();
    let second = slot.issue_ticket();

    assert!(slot.commit(second, result("newest")));
    assert!(!slot.commit(first, result("stale")));

    assert_eq!(slot.current().map(|r| r.summary.as_str()), Some("newest"));
}

#[test]
fn given_outstanding_ticket_when_slot_is_cleared_then_commit_is_rejected() {
    let mut slot = AnalysisSlot::default();
    let ticket = slot.issue_ticket();

    slot.clear();

    assert!(!slot.commit(ticket, result("late")));
    assert!(slot.current().is_none());
}

#[test]
fn given_issued_tickets_when_comparing_then_values_increase() {
    let mut slot = AnalysisSlot::default();

    let a = slot.issue_ticket();
    let b = slot.issue_ticket();

    assert!(b.value() > a.value());
}
