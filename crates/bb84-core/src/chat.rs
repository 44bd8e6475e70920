//! Append-only chat log.
//!
//! Every protocol action narrates itself as a chat entry attributed to
//! Alice, Bob, Eve, or the system. Entries are never mutated after creation
//! and insertion order is significant.

use std::time::{SystemTime, UNIX_EPOCH};

/// Who a chat entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Alice, the sender of qubits.
    Alice,
    /// Bob, the receiver.
    Bob,
    /// Eve, the eavesdropper.
    Eve,
    /// Protocol narration.
    System,
}

impl Sender {
    /// Display name for this sender.
    pub fn name(self) -> &'static str {
        match self {
            Self::Alice => "Alice",
            Self::Bob => "Bob",
            Self::Eve => "Eve",
            Self::System => "System",
        }
    }
}

/// One immutable chat entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Monotonic id within the log.
    pub id: u64,
    /// Attributed sender.
    pub sender: Sender,
    /// Message text.
    pub text: String,
    /// Wall-clock timestamp in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Round this entry refers to, if any.
    pub round: Option<usize>,
}

/// Append-only log of [`ChatMessage`] entries.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry without a round reference.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.push_entry(sender, text, None);
    }

    /// Append an entry referring to a specific round.
    pub fn push_round(&mut self, sender: Sender, text: impl Into<String>, round: usize) {
        self.push_entry(sender, text, Some(round));
    }

    fn push_entry(&mut self, sender: Sender, text: impl Into<String>, round: Option<usize>) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            sender,
            text: text.into(),
            timestamp: now_millis(),
            round,
        });
    }

    /// All entries in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all entries. Ids keep counting up so old ids are never reused.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis() as u64)
}
