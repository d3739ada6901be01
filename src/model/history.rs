use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    Npc(String),
    Player,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Npc(name) => f.write_str(name),
            Speaker::Player => f.write_str("Player"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Chronological, append-only record of one exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(HistoryEntry {
            speaker,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Session boundaries only.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
