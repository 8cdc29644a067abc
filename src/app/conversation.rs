//! Conversation state for the two-step schedule entry.
//!
//! The device supports one pending input at a time, bound to the chat
//! that requested it — a single-operator design.  Isolating the flag
//! pair behind this type means a future multi-operator extension only
//! touches this module.
//!
//! Invariant: when no input is pending, the bound chat identity is empty.

/// Idle ↔ AwaitingTimeInput state for the prompted schedule add.
#[derive(Debug, Default)]
pub struct ConversationState {
    awaiting_time_input: bool,
    pending_chat: String,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any chat has a pending time input.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting_time_input
    }

    /// Bind the pending input to `chat_id` and enter AwaitingTimeInput.
    pub fn begin_time_entry(&mut self, chat_id: &str) {
        self.awaiting_time_input = true;
        self.pending_chat = chat_id.to_string();
    }

    /// True if `chat_id` is the chat whose next message is captured as
    /// time input.  Messages from other chats are dispatched normally
    /// and do not disturb the pending state.
    pub fn claims(&self, chat_id: &str) -> bool {
        self.awaiting_time_input && self.pending_chat == chat_id
    }

    /// Return to Idle, releasing the bound chat.
    pub fn reset(&mut self) {
        self.awaiting_time_input = false;
        self.pending_chat.clear();
    }
}
