//! # Actions
//!
//! Everything that can happen in docent becomes an `Action`.
//! User asks a question? That's `Action::Ask(text)`.
//! The server answers? That's `Action::Answered { session_id, result }`.
//!
//! `update()` takes the current state and an action, mutates the state, and
//! returns an `Effect` describing the I/O to perform next. No I/O happens
//! here: requests are executed by `core::sync` and their results come back
//! as more actions.
//!
//! ```text
//! State + Action  →  update()  →  State' + Effect
//!                                        │
//!                      Effect::Spawn(requests) → sync::execute → Action
//! ```

use std::fmt;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::core::state::{SessionView, ViewState};
use crate::remote::{ChatEntry, Mode, RemoteError};

/// Description used when the user gives none.
pub const DEFAULT_DESCRIPTION: &str = "New session";

/// Input problems caught before any request is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The operation needs an active session.
    NoActiveSession,
    /// Upload requested without a file path.
    MissingFile,
    /// The upload path could not be read.
    UnreadableFile { path: PathBuf, reason: String },
    /// A search was requested with a blank query; carries what was being searched.
    EmptyQuery(&'static str),
    /// The referenced session is not in the last-fetched list.
    UnknownSession(String),
    /// The referenced document is not attached to the session.
    UnknownDocument(String),
    UnknownCommand(String),
    /// A command was missing a required argument; carries its usage line.
    MissingArgument(&'static str),
    InvalidArgument(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoActiveSession => write!(f, "Select a session first"),
            ValidationError::MissingFile => write!(f, "Choose a file to upload"),
            ValidationError::UnreadableFile { path, reason } => {
                write!(f, "Cannot read {}: {reason}", path.display())
            }
            ValidationError::EmptyQuery(scope) => {
                write!(f, "Enter a keyword to search in {scope}")
            }
            ValidationError::UnknownSession(id) => write!(f, "Unknown session: {id}"),
            ValidationError::UnknownDocument(name) => {
                write!(f, "No document named {name} in this session")
            }
            ValidationError::UnknownCommand(cmd) => {
                write!(f, "Unknown command: {cmd} (type /help)")
            }
            ValidationError::MissingArgument(usage) => write!(f, "Usage: {usage}"),
            ValidationError::InvalidArgument(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A single backend call to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `list_sessions` followed by `list_documents` for each session.
    Refresh,
    CreateSession {
        description: String,
    },
    DeleteSession {
        session_id: String,
    },
    Upload {
        session_id: String,
        path: PathBuf,
    },
    DeleteDocument {
        session_id: String,
        filename: String,
    },
    Ask {
        session_id: String,
        question: String,
        mode: Option<Mode>,
    },
    History {
        session_id: String,
    },
    SwitchMode {
        session_id: String,
        mode: Mode,
    },
    SearchDocuments {
        session_id: String,
        query: String,
    },
    SearchChat {
        session_id: String,
        query: String,
    },
}

#[derive(Debug)]
pub enum Action {
    // ── User intents ────────────────────────────────────────────────────
    Refresh,
    CreateSession(String),
    SelectSession(String),
    /// Delete the given session, or the active one when `None`.
    DeleteSession(Option<String>),
    /// Flip the given session's mode and persist it.
    ToggleMode(String),
    /// Set the active session's mode.
    SwitchMode(Mode),
    LoadHistory,
    Ask(String),
    Upload(PathBuf),
    /// Delete a document from the given session, or the active one when `None`.
    DeleteDocument {
        session_id: Option<String>,
        filename: String,
    },
    SearchDocuments(String),
    SearchChat(String),
    Reject(ValidationError),
    ShowAlert(String),
    DismissAlert,
    Status(String),
    Quit,

    // ── Voice capability ────────────────────────────────────────────────
    VoiceStarted,
    VoiceStopped,
    VoiceTranscript(String),
    VoiceUnavailable(String),

    // ── Request results ─────────────────────────────────────────────────
    SessionsLoaded(Result<Vec<SessionView>, RemoteError>),
    SessionCreated(Result<String, RemoteError>),
    SessionDeleted {
        session_id: String,
        result: Result<String, RemoteError>,
    },
    DocumentUploaded(Result<String, RemoteError>),
    /// The upload never left the client (file unreadable).
    UploadRejected(ValidationError),
    DocumentDeleted {
        session_id: String,
        filename: String,
        result: Result<String, RemoteError>,
    },
    ModeSwitched {
        session_id: String,
        mode: Mode,
        result: Result<String, RemoteError>,
    },
    HistoryLoaded {
        session_id: String,
        result: Result<Vec<ChatEntry>, RemoteError>,
    },
    Answered {
        session_id: String,
        result: Result<String, RemoteError>,
    },
    DocumentMatches(Result<Vec<String>, RemoteError>),
    ChatMatches(Result<Vec<ChatEntry>, RemoteError>),
}

impl Action {
    /// True for actions that carry the result of a request.
    fn is_result(&self) -> bool {
        matches!(
            self,
            Action::SessionsLoaded(_)
                | Action::SessionCreated(_)
                | Action::SessionDeleted { .. }
                | Action::DocumentUploaded(_)
                | Action::UploadRejected(_)
                | Action::DocumentDeleted { .. }
                | Action::ModeSwitched { .. }
                | Action::HistoryLoaded { .. }
                | Action::Answered { .. }
                | Action::DocumentMatches(_)
                | Action::ChatMatches(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Run these requests; each reports back with one result action.
    Spawn(Vec<Request>),
    /// Put text into the question input without submitting it.
    FillInput(String),
    Quit,
}

fn spawn(state: &mut ViewState, requests: Vec<Request>) -> Effect {
    state.in_flight += requests.len();
    Effect::Spawn(requests)
}

fn reject(state: &mut ViewState, error: ValidationError) -> Effect {
    info!("Rejected: {}", error);
    state.alert = Some(error.to_string());
    Effect::None
}

fn require_session(state: &ViewState) -> Result<String, ValidationError> {
    state
        .current_session_id
        .clone()
        .ok_or(ValidationError::NoActiveSession)
}

pub fn update(state: &mut ViewState, action: Action) -> Effect {
    if action.is_result() {
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    match action {
        Action::Refresh => {
            state.status_message = "Refreshing sessions...".to_string();
            spawn(state, vec![Request::Refresh])
        }
        Action::CreateSession(description) => {
            let description = description.trim();
            let description = if description.is_empty() {
                DEFAULT_DESCRIPTION.to_string()
            } else {
                description.to_string()
            };
            spawn(state, vec![Request::CreateSession { description }])
        }
        Action::SelectSession(session_id) => {
            info!("Selecting session {}", session_id);
            state.current_session_id = Some(session_id.clone());
            state.status_message = match state.session(&session_id) {
                Some(view) => format!("Session: {}", view.session.display_description()),
                None => format!("Session: {session_id}"),
            };
            spawn(state, vec![Request::History { session_id }])
        }
        Action::DeleteSession(target) => {
            let session_id = match target.map(Ok).unwrap_or_else(|| require_session(state)) {
                Ok(id) => id,
                Err(e) => return reject(state, e),
            };
            spawn(state, vec![Request::DeleteSession { session_id }])
        }
        Action::ToggleMode(session_id) => {
            let Some(view) = state.session(&session_id) else {
                return reject(state, ValidationError::UnknownSession(session_id));
            };
            let mode = view.session.mode.toggle();
            spawn(state, vec![Request::SwitchMode { session_id, mode }])
        }
        Action::SwitchMode(mode) => match require_session(state) {
            Ok(session_id) => spawn(state, vec![Request::SwitchMode { session_id, mode }]),
            Err(e) => reject(state, e),
        },
        Action::LoadHistory => match require_session(state) {
            Ok(session_id) => spawn(state, vec![Request::History { session_id }]),
            Err(e) => reject(state, e),
        },
        Action::Ask(question) => {
            let session_id = match require_session(state) {
                Ok(id) => id,
                Err(e) => return reject(state, e),
            };
            let question = question.trim().to_string();
            if question.is_empty() {
                return Effect::None;
            }
            let mode = state.active_mode();
            state.transcript.push_user(question.clone());
            state.transcript.show_typing();
            spawn(
                state,
                vec![Request::Ask {
                    session_id,
                    question,
                    mode,
                }],
            )
        }
        Action::Upload(path) => {
            let session_id = match require_session(state) {
                Ok(id) => id,
                Err(e) => return reject(state, e),
            };
            if path.as_os_str().is_empty() {
                return reject(state, ValidationError::MissingFile);
            }
            state.status_message = format!("Uploading {}...", path.display());
            spawn(state, vec![Request::Upload { session_id, path }])
        }
        Action::DeleteDocument {
            session_id,
            filename,
        } => {
            let session_id = match session_id.map(Ok).unwrap_or_else(|| require_session(state)) {
                Ok(id) => id,
                Err(e) => return reject(state, e),
            };
            let known = state
                .session(&session_id)
                .is_some_and(|v| v.documents.iter().any(|d| d.filename == filename));
            if !known {
                return reject(state, ValidationError::UnknownDocument(filename));
            }
            spawn(
                state,
                vec![Request::DeleteDocument {
                    session_id,
                    filename,
                }],
            )
        }
        Action::SearchDocuments(query) => {
            search(state, query, "documents", |session_id, query| {
                Request::SearchDocuments { session_id, query }
            })
        }
        Action::SearchChat(query) => search(state, query, "chat", |session_id, query| {
            Request::SearchChat { session_id, query }
        }),
        Action::Reject(error) => reject(state, error),
        Action::ShowAlert(message) => {
            state.alert = Some(message);
            Effect::None
        }
        Action::DismissAlert => {
            state.alert = None;
            Effect::None
        }
        Action::Status(message) => {
            state.status_message = message;
            Effect::None
        }
        Action::Quit => Effect::Quit,

        Action::VoiceStarted => {
            state.listening = true;
            state.status_message = "Listening...".to_string();
            Effect::None
        }
        Action::VoiceStopped => {
            state.listening = false;
            state.status_message = "Voice input stopped".to_string();
            Effect::None
        }
        Action::VoiceTranscript(text) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                Effect::None
            } else {
                Effect::FillInput(text)
            }
        }
        Action::VoiceUnavailable(reason) => {
            state.listening = false;
            state.status_message = format!("Voice input not available: {reason}");
            Effect::None
        }

        Action::SessionsLoaded(result) => match result {
            Ok(sessions) => {
                debug!("Sessions loaded: {}", sessions.len());
                state.sessions = sessions;
                if let Some(id) = state.current_session_id.clone()
                    && state.session(&id).is_none()
                {
                    info!("Active session {} no longer exists", id);
                    state.clear_active();
                }
                state.status_message = format!("{} sessions", state.sessions.len());
                Effect::None
            }
            Err(e) => failed(state, "List sessions", e),
        },
        Action::SessionCreated(result) => match result {
            Ok(session_id) => {
                info!("Session {} created and activated", session_id);
                state.current_session_id = Some(session_id.clone());
                state.transcript.clear();
                spawn(state, vec![Request::Refresh, Request::History { session_id }])
            }
            Err(e) => failed(state, "Create session", e),
        },
        Action::SessionDeleted { session_id, result } => match result {
            Ok(message) => {
                state.sessions.retain(|s| s.session.id != session_id);
                if state.current_session_id.as_deref() == Some(session_id.as_str()) {
                    state.clear_active();
                }
                state.status_message = message;
                spawn(state, vec![Request::Refresh])
            }
            Err(e) => failed(state, "Delete session", e),
        },
        Action::DocumentUploaded(result) => match result {
            Ok(message) => {
                state.alert = Some(message);
                spawn(state, vec![Request::Refresh])
            }
            Err(e) => failed(state, "Upload", e),
        },
        Action::UploadRejected(error) => reject(state, error),
        Action::DocumentDeleted {
            session_id,
            filename,
            result,
        } => match result {
            Ok(message) => {
                if let Some(view) = state.session_mut(&session_id) {
                    view.documents.retain(|d| d.filename != filename);
                }
                state.status_message = message;
                spawn(state, vec![Request::Refresh])
            }
            Err(e) => failed(state, "Delete document", e),
        },
        Action::ModeSwitched {
            session_id,
            mode,
            result,
        } => match result {
            Ok(message) => {
                if let Some(view) = state.session_mut(&session_id) {
                    view.session.mode = mode;
                }
                state.alert = Some(message);
                spawn(state, vec![Request::Refresh])
            }
            Err(e) => failed(state, "Switch mode", e),
        },
        Action::HistoryLoaded { session_id, result } => {
            if state.current_session_id.as_deref() != Some(session_id.as_str()) {
                debug!("Ignoring history for inactive session {}", session_id);
                return Effect::None;
            }
            match result {
                Ok(history) => {
                    state.transcript.load_history(&history);
                    Effect::None
                }
                Err(e) => failed(state, "Load history", e),
            }
        }
        Action::Answered { session_id, result } => {
            state.transcript.hide_typing();
            if state.current_session_id.as_deref() != Some(session_id.as_str()) {
                debug!("Dropping answer for inactive session {}", session_id);
                return Effect::None;
            }
            match result {
                Ok(answer) => {
                    state.transcript.push_bot(answer);
                    spawn(state, vec![Request::Refresh])
                }
                Err(e) => {
                    warn!("Ask failed: {}", e);
                    state.transcript.push_error(&e);
                    Effect::None
                }
            }
        }
        Action::DocumentMatches(result) => match result {
            Ok(matches) if matches.is_empty() => {
                state.transcript.push_bot("No document matches found.");
                Effect::None
            }
            Ok(matches) => {
                state
                    .transcript
                    .push_bot(format!("Document matches:\n{}", matches.join("\n\n")));
                Effect::None
            }
            Err(e) => failed(state, "Document search", e),
        },
        Action::ChatMatches(result) => match result {
            Ok(matches) if matches.is_empty() => {
                state.transcript.push_bot("No chat matches found.");
                Effect::None
            }
            Ok(matches) => {
                let pretty = matches
                    .iter()
                    .map(|m| format!("Q: {}\nA: {}", m.question, m.answer))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                state
                    .transcript
                    .push_bot(format!("Chat search results:\n{pretty}"));
                Effect::None
            }
            Err(e) => failed(state, "Chat search", e),
        },
    }
}

fn search(
    state: &mut ViewState,
    query: String,
    scope: &'static str,
    build: impl FnOnce(String, String) -> Request,
) -> Effect {
    let session_id = match require_session(state) {
        Ok(id) => id,
        Err(e) => return reject(state, e),
    };
    let query = query.trim().to_string();
    if query.is_empty() {
        return reject(state, ValidationError::EmptyQuery(scope));
    }
    spawn(state, vec![build(session_id, query)])
}

fn failed(state: &mut ViewState, operation: &str, error: RemoteError) -> Effect {
    warn!("{} failed: {}", operation, error);
    state.alert = Some(format!("{operation} failed: {error}"));
    Effect::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::{EMPTY_HISTORY, ERROR_MARKER, Role};
    use crate::remote::Document;
    use crate::test_support::session_view;

    fn state_with(sessions: Vec<SessionView>, active: Option<&str>) -> ViewState {
        let mut state = ViewState::new("http://test");
        state.sessions = sessions;
        state.current_session_id = active.map(str::to_string);
        state
    }

    #[test]
    fn test_ask_without_session_is_rejected_before_any_request() {
        let mut state = state_with(vec![], None);
        let effect = update(&mut state, Action::Ask("hello".into()));
        assert_eq!(effect, Effect::None);
        assert_eq!(state.alert.as_deref(), Some("Select a session first"));
        assert!(state.transcript.is_empty());
        assert_eq!(state.in_flight, 0);
    }

    #[test]
    fn test_blank_question_is_ignored() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        assert_eq!(update(&mut state, Action::Ask("   ".into())), Effect::None);
        assert!(state.transcript.is_empty());
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_ask_echoes_user_and_shows_typing() {
        let mut state = state_with(vec![session_view("a", Mode::Global, &[])], Some("a"));
        let effect = update(&mut state, Action::Ask(" why? ".into()));
        assert_eq!(
            effect,
            Effect::Spawn(vec![Request::Ask {
                session_id: "a".into(),
                question: "why?".into(),
                mode: Some(Mode::Global),
            }])
        );
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript.entries()[0].role, Role::User);
        assert!(state.transcript.is_typing());
        assert_eq!(state.in_flight, 1);
    }

    #[test]
    fn test_failed_ask_appends_exactly_one_error_entry() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        update(&mut state, Action::Ask("q".into()));
        let effect = update(
            &mut state,
            Action::Answered {
                session_id: "a".into(),
                result: Err(RemoteError::Network("connection refused".into())),
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(!state.transcript.is_typing());

        let entries = state.transcript.entries();
        let users = entries.iter().filter(|e| e.role == Role::User).count();
        let bots: Vec<_> = entries.iter().filter(|e| e.role == Role::Bot).collect();
        assert_eq!(users, 1);
        assert_eq!(bots.len(), 1);
        assert!(bots[0].text.starts_with(ERROR_MARKER));
        assert_eq!(state.in_flight, 0);
    }

    #[test]
    fn test_successful_answer_refreshes_list() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        update(&mut state, Action::Ask("q".into()));
        let effect = update(
            &mut state,
            Action::Answered {
                session_id: "a".into(),
                result: Ok("42".into()),
            },
        );
        assert_eq!(effect, Effect::Spawn(vec![Request::Refresh]));
        assert_eq!(state.transcript.entries()[1].text, "42");
    }

    #[test]
    fn test_answer_for_previous_session_is_dropped_after_switch() {
        let mut state = state_with(
            vec![
                session_view("a", Mode::Local, &[]),
                session_view("b", Mode::Local, &[]),
            ],
            Some("a"),
        );
        update(&mut state, Action::Ask("q".into()));
        update(&mut state, Action::SelectSession("b".into()));
        update(
            &mut state,
            Action::HistoryLoaded {
                session_id: "b".into(),
                result: Ok(vec![]),
            },
        );

        let effect = update(
            &mut state,
            Action::Answered {
                session_id: "a".into(),
                result: Ok("answer for a".into()),
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(!state.transcript.is_typing());
        let texts: Vec<_> = state.transcript.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec![EMPTY_HISTORY]);
        assert_eq!(state.in_flight, 0);
    }

    #[test]
    fn test_answer_after_deleting_its_session_leaves_transcript_empty() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        update(&mut state, Action::Ask("q".into()));
        update(&mut state, Action::DeleteSession(None));
        update(
            &mut state,
            Action::SessionDeleted {
                session_id: "a".into(),
                result: Ok("Session deleted".into()),
            },
        );

        let effect = update(
            &mut state,
            Action::Answered {
                session_id: "a".into(),
                result: Err(RemoteError::Api {
                    status: 404,
                    body: "Session not found".into(),
                }),
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(state.current_session_id.is_none());
        assert!(state.transcript.is_empty());
        assert!(!state.transcript.is_typing());
    }

    #[test]
    fn test_deleting_active_session_clears_selection_and_transcript() {
        let mut state = state_with(
            vec![
                session_view("a", Mode::Local, &[]),
                session_view("b", Mode::Local, &[]),
            ],
            Some("a"),
        );
        state.transcript.push_user("hello");
        state.transcript.push_bot("hi");

        let effect = update(&mut state, Action::DeleteSession(None));
        assert_eq!(
            effect,
            Effect::Spawn(vec![Request::DeleteSession {
                session_id: "a".into()
            }])
        );

        update(
            &mut state,
            Action::SessionDeleted {
                session_id: "a".into(),
                result: Ok("Session deleted".into()),
            },
        );
        assert!(state.current_session_id.is_none());
        assert!(state.transcript.is_empty());
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn test_deleting_other_session_keeps_active() {
        let mut state = state_with(
            vec![
                session_view("a", Mode::Local, &[]),
                session_view("b", Mode::Local, &[]),
            ],
            Some("a"),
        );
        state.transcript.push_user("hello");
        update(
            &mut state,
            Action::SessionDeleted {
                session_id: "b".into(),
                result: Ok("Session deleted".into()),
            },
        );
        assert_eq!(state.current_session_id.as_deref(), Some("a"));
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_failed_delete_keeps_state_and_alerts() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        update(
            &mut state,
            Action::SessionDeleted {
                session_id: "a".into(),
                result: Err(RemoteError::Api {
                    status: 404,
                    body: "Session not found".into(),
                }),
            },
        );
        assert_eq!(state.current_session_id.as_deref(), Some("a"));
        assert!(
            state
                .alert
                .as_deref()
                .is_some_and(|a| a.starts_with("Delete session failed"))
        );
    }

    #[test]
    fn test_document_delete_only_touches_matching_file() {
        let mut state = state_with(
            vec![
                session_view("a", Mode::Local, &["x.pdf", "y.txt"]),
                session_view("b", Mode::Local, &["x.pdf"]),
            ],
            Some("a"),
        );
        let effect = update(
            &mut state,
            Action::DeleteDocument {
                session_id: None,
                filename: "x.pdf".into(),
            },
        );
        assert_eq!(
            effect,
            Effect::Spawn(vec![Request::DeleteDocument {
                session_id: "a".into(),
                filename: "x.pdf".into(),
            }])
        );
        update(
            &mut state,
            Action::DocumentDeleted {
                session_id: "a".into(),
                filename: "x.pdf".into(),
                result: Ok("x.pdf deleted successfully".into()),
            },
        );
        assert_eq!(state.sessions[0].documents, vec![Document::new("y.txt")]);
        assert_eq!(state.sessions[1].documents, vec![Document::new("x.pdf")]);
    }

    #[test]
    fn test_document_delete_of_unknown_file_is_rejected() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &["x.pdf"])], Some("a"));
        let effect = update(
            &mut state,
            Action::DeleteDocument {
                session_id: None,
                filename: "nope.pdf".into(),
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(state.alert.is_some());
    }

    #[test]
    fn test_refresh_clears_active_session_that_disappeared() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        state.transcript.push_user("q");
        update(
            &mut state,
            Action::SessionsLoaded(Ok(vec![session_view("b", Mode::Local, &[])])),
        );
        assert!(state.current_session_id.is_none());
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_create_session_defaults_description_and_activates() {
        let mut state = state_with(vec![], None);
        let effect = update(&mut state, Action::CreateSession("  ".into()));
        assert_eq!(
            effect,
            Effect::Spawn(vec![Request::CreateSession {
                description: DEFAULT_DESCRIPTION.into()
            }])
        );

        let effect = update(&mut state, Action::SessionCreated(Ok("new-id".into())));
        assert_eq!(state.current_session_id.as_deref(), Some("new-id"));
        assert_eq!(
            effect,
            Effect::Spawn(vec![
                Request::Refresh,
                Request::History {
                    session_id: "new-id".into()
                }
            ])
        );
    }

    #[test]
    fn test_select_session_loads_history() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], None);
        let effect = update(&mut state, Action::SelectSession("a".into()));
        assert_eq!(state.current_session_id.as_deref(), Some("a"));
        assert_eq!(
            effect,
            Effect::Spawn(vec![Request::History {
                session_id: "a".into()
            }])
        );
    }

    #[test]
    fn test_stale_history_is_ignored() {
        let mut state = state_with(vec![], Some("b"));
        update(
            &mut state,
            Action::HistoryLoaded {
                session_id: "a".into(),
                result: Ok(vec![ChatEntry::new("q", "a")]),
            },
        );
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_toggle_mode_requests_opposite_mode() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], None);
        let effect = update(&mut state, Action::ToggleMode("a".into()));
        assert_eq!(
            effect,
            Effect::Spawn(vec![Request::SwitchMode {
                session_id: "a".into(),
                mode: Mode::Global
            }])
        );
    }

    #[test]
    fn test_mode_switch_confirmation_updates_local_mode() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        update(
            &mut state,
            Action::ModeSwitched {
                session_id: "a".into(),
                mode: Mode::Global,
                result: Ok("Mode changed to global".into()),
            },
        );
        assert_eq!(state.active_mode(), Some(Mode::Global));
        assert_eq!(state.alert.as_deref(), Some("Mode changed to global"));
    }

    #[test]
    fn test_search_requires_query() {
        let mut state = state_with(vec![session_view("a", Mode::Local, &[])], Some("a"));
        let effect = update(&mut state, Action::SearchDocuments(" ".into()));
        assert_eq!(effect, Effect::None);
        assert_eq!(
            state.alert.as_deref(),
            Some("Enter a keyword to search in documents")
        );
    }

    #[test]
    fn test_search_results_are_appended_as_bot_entries() {
        let mut state = state_with(vec![], Some("a"));
        update(&mut state, Action::DocumentMatches(Ok(vec![])));
        update(
            &mut state,
            Action::ChatMatches(Ok(vec![ChatEntry::new("**rust**?", "yes")])),
        );
        let entries = state.transcript.entries();
        assert_eq!(entries[0].text, "No document matches found.");
        assert_eq!(entries[1].text, "Chat search results:\nQ: **rust**?\nA: yes");
    }

    #[test]
    fn test_upload_without_session_is_rejected() {
        let mut state = state_with(vec![], None);
        let effect = update(&mut state, Action::Upload(PathBuf::from("a.pdf")));
        assert_eq!(effect, Effect::None);
        assert_eq!(state.alert.as_deref(), Some("Select a session first"));
    }

    #[test]
    fn test_upload_success_alerts_and_refreshes() {
        let mut state = state_with(vec![], Some("a"));
        let effect = update(&mut state, Action::DocumentUploaded(Ok("a.pdf uploaded".into())));
        assert_eq!(effect, Effect::Spawn(vec![Request::Refresh]));
        assert_eq!(state.alert.as_deref(), Some("a.pdf uploaded"));
    }

    #[test]
    fn test_voice_transcript_fills_input() {
        let mut state = state_with(vec![], None);
        assert_eq!(
            update(&mut state, Action::VoiceTranscript(" hello there ".into())),
            Effect::FillInput("hello there".into())
        );
        assert_eq!(update(&mut state, Action::VoiceTranscript("  ".into())), Effect::None);
    }

    #[test]
    fn test_in_flight_never_underflows() {
        let mut state = state_with(vec![], None);
        update(&mut state, Action::SessionsLoaded(Ok(vec![])));
        assert_eq!(state.in_flight, 0);
    }
}
