//! # Transcript
//!
//! The append-only conversation shown to the user, plus the transient
//! "typing" placeholder displayed while an answer is pending.
//!
//! ```text
//! typing:  absent ──show_typing()──▶ shown
//!          absent ◀──hide_typing()── shown
//! ```
//!
//! Both transitions are idempotent. Entries never change once appended;
//! the only way to remove them is `clear()`, used when switching sessions.

use crate::remote::ChatEntry;

/// Prefix of bot entries that report a failed request.
pub const ERROR_MARKER: &str = "⚠️ Error:";
/// Text of the typing placeholder.
pub const TYPING_PLACEHOLDER: &str = "• • •";
/// Shown when a session has no history yet.
pub const EMPTY_HISTORY: &str = "(No chat history)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    typing: bool,
    /// Bumped whenever entries are removed, so renderers can tell an
    /// append from a replacement.
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, text.into());
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.push(Role::Bot, text.into());
    }

    /// Appends a bot entry carrying the error marker.
    pub fn push_error(&mut self, error: impl std::fmt::Display) {
        self.push(Role::Bot, format!("{ERROR_MARKER} {error}"));
    }

    fn push(&mut self, role: Role, text: String) {
        self.entries.push(Entry { role, text });
    }

    /// Drops every entry and the typing placeholder.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.typing = false;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn show_typing(&mut self) {
        self.typing = true;
    }

    pub fn hide_typing(&mut self) {
        self.typing = false;
    }

    /// Replaces the transcript with a session's full history, in order.
    pub fn load_history(&mut self, history: &[ChatEntry]) {
        self.clear();
        if history.is_empty() {
            self.push_bot(EMPTY_HISTORY);
            return;
        }
        for entry in history {
            self.push_user(entry.question.clone());
            self.push_bot(entry.answer.clone());
        }
    }

    /// Number of rows a renderer should draw, counting the placeholder.
    pub fn visible_len(&self) -> usize {
        self.entries.len() + usize::from(self.typing)
    }
}
