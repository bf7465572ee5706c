use chrono::{DateTime, Utc};

use super::{ChatMessage, SentimentResult, SessionId};

/// Sequence number handed out when an analysis starts against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Single result slot of a session.
///
/// Only the most recently issued ticket may write into the slot; results
/// carrying an older ticket are stale and rejected.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSlot {
    latest_issued: u64,
    current: Option<SentimentResult>,
}

impl AnalysisSlot {
    pub fn issue_ticket(&mut self) -> RequestTicket {
        self.latest_issued += 1;
        RequestTicket(self.latest_issued)
    }

    /// Returns `false` and leaves the slot untouched when `ticket` is stale.
    pub fn commit(&mut self, ticket: RequestTicket, result: SentimentResult) -> bool {
        if ticket.0 != self.latest_issued {
            return false;
        }
        self.current = Some(result);
        true
    }

    /// Empties the slot and invalidates every outstanding ticket.
    pub fn clear(&mut self) {
        self.latest_issued += 1;
        self.current = None;
    }

    pub fn current(&self) -> Option<&SentimentResult> {
        self.current.as_ref()
    }
}

/// Session-scoped, in-memory chat state. Nothing here outlives the process.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
    analysis: AnalysisSlot,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            messages: Vec::new(),
            analysis: AnalysisSlot::default(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn clear_history(&mut self) {
        self.messages.clear();
    }

    pub fn analysis(&self) -> &AnalysisSlot {
        &self.analysis
    }

    pub fn analysis_mut(&mut self) -> &mut AnalysisSlot {
        &mut self.analysis
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
