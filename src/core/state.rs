//! # View State
//!
//! Everything the client knows about the remote store and the screen,
//! owned by a single event loop.
//!
//! ```text
//! ViewState
//! ├── current_session_id: Option<String>  // active session (None = nothing selected)
//! ├── sessions: Vec<SessionView>          // last-fetched sessions + their documents
//! ├── transcript: Transcript              // chat shown for the active session
//! ├── status_message: String              // status bar text
//! ├── alert: Option<String>               // blocking message, dismissed by the user
//! ├── listening: bool                     // voice capture running
//! └── in_flight: usize                    // requests awaiting a response
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::transcript::Transcript;
use crate::core::view::{self, ViewTree};
use crate::remote::{Document, Mode, Session};

/// A session together with the documents fetched for it during the last refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session: Session,
    pub documents: Vec<Document>,
}

pub struct ViewState {
    pub base_url: String,
    pub current_session_id: Option<String>,
    pub sessions: Vec<SessionView>,
    pub transcript: Transcript,
    pub status_message: String,
    pub alert: Option<String>,
    pub listening: bool,
    pub in_flight: usize,
}

impl ViewState {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            current_session_id: None,
            sessions: Vec::new(),
            transcript: Transcript::new(),
            status_message: String::from("Select or create a session"),
            alert: None,
            listening: false,
            in_flight: 0,
        }
    }

    pub fn session(&self, id: &str) -> Option<&SessionView> {
        self.sessions.iter().find(|s| s.session.id == id)
    }

    pub fn session_mut(&mut self, id: &str) -> Option<&mut SessionView> {
        self.sessions.iter_mut().find(|s| s.session.id == id)
    }

    pub fn active_session(&self) -> Option<&SessionView> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.session(id))
    }

    /// Mode of the active session as of the last refresh.
    pub fn active_mode(&self) -> Option<Mode> {
        self.active_session().map(|s| s.session.mode)
    }

    /// Drops the active session and everything shown for it.
    pub fn clear_active(&mut self) {
        self.current_session_id = None;
        self.transcript.clear();
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn view_tree(&self) -> ViewTree {
        view::render(&self.sessions, self.current_session_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::session_view;

    #[test]
    fn test_view_state_new_defaults() {
        let state = ViewState::new("http://localhost:5000");
        assert!(state.current_session_id.is_none());
        assert!(state.transcript.is_empty());
        assert!(!state.is_busy());
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_active_mode_follows_last_fetched_list() {
        let mut state = ViewState::new("http://x");
        state.sessions = vec![session_view("a", Mode::Global, &[])];
        assert_eq!(state.active_mode(), None);
        state.current_session_id = Some("a".to_string());
        assert_eq!(state.active_mode(), Some(Mode::Global));
    }

    #[test]
    fn test_clear_active_empties_transcript() {
        let mut state = ViewState::new("http://x");
        state.current_session_id = Some("a".to_string());
        state.transcript.push_user("hello");
        state.clear_active();
        assert!(state.current_session_id.is_none());
        assert!(state.transcript.is_empty());
    }
}
