use serde::Serialize;

/// One completed (question, answer) exchange.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

/// Append-only log of one session's turns.
///
/// Owned exclusively by the session's orchestrator; never shared across
/// sessions. Entries are only removed via `clear`.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Linear transcript used as condensation context.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            out.push_str("User: ");
            out.push_str(&turn.question);
            out.push('\n');
            out.push_str("Assistant: ");
            out.push_str(&turn.answer);
            out.push('\n');
        }
        out
    }

    /// Ordered (role, text) pairs for the transcript API.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            entries.push(("user", turn.question.as_str()));
            entries.push(("assistant", turn.answer.as_str()));
        }
        entries
    }
}
