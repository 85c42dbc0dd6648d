//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::state::SessionView;
use crate::remote::{Backend, ChatEntry, Document, Mode, RemoteError, Session};

/// Builds a `SessionView` with the given documents.
pub fn session_view(id: &str, mode: Mode, docs: &[&str]) -> SessionView {
    SessionView {
        session: Session {
            id: id.to_string(),
            description: format!("session {id}"),
            mode,
        },
        documents: docs.iter().map(|d| Document::new(*d)).collect(),
    }
}

struct StoredSession {
    session: Session,
    documents: Vec<Document>,
    history: Vec<ChatEntry>,
}

#[derive(Default)]
struct Store {
    sessions: Vec<StoredSession>,
    next_id: usize,
    fail_all: Option<RemoteError>,
    fail_documents: HashSet<String>,
    asked_modes: Vec<Option<Mode>>,
    uploads: usize,
}

/// An in-memory backend that behaves like the real server.
pub struct ScriptedBackend {
    store: Mutex<Store>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }

    pub fn add_session(&self, id: &str, description: &str, mode: Mode, docs: &[&str]) {
        self.store.lock().unwrap().sessions.push(StoredSession {
            session: Session {
                id: id.to_string(),
                description: description.to_string(),
                mode,
            },
            documents: docs.iter().map(|d| Document::new(*d)).collect(),
            history: Vec::new(),
        });
    }

    pub fn add_history(&self, id: &str, entry: ChatEntry) {
        let mut store = self.store.lock().unwrap();
        if let Some(s) = store.sessions.iter_mut().find(|s| s.session.id == id) {
            s.history.push(entry);
        }
    }

    /// Every subsequent call fails with `error`.
    pub fn fail_all(&self, error: RemoteError) {
        self.store.lock().unwrap().fail_all = Some(error);
    }

    /// `list_documents` fails for this session only.
    pub fn fail_documents_for(&self, id: &str) {
        self.store
            .lock()
            .unwrap()
            .fail_documents
            .insert(id.to_string());
    }

    pub fn asked_modes(&self) -> Vec<Option<Mode>> {
        self.store.lock().unwrap().asked_modes.clone()
    }

    pub fn upload_count(&self) -> usize {
        self.store.lock().unwrap().uploads
    }

    pub fn mode_of(&self, id: &str) -> Option<Mode> {
        let store = self.store.lock().unwrap();
        store
            .sessions
            .iter()
            .find(|s| s.session.id == id)
            .map(|s| s.session.mode)
    }

    fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut StoredSession) -> T,
    ) -> Result<T, RemoteError> {
        let mut store = self.store.lock().unwrap();
        if let Some(err) = &store.fail_all {
            return Err(err.clone());
        }
        store
            .sessions
            .iter_mut()
            .find(|s| s.session.id == id)
            .map(f)
            .ok_or_else(not_found)
    }

    fn check(&self) -> Result<(), RemoteError> {
        match &self.store.lock().unwrap().fail_all {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn not_found() -> RemoteError {
    RemoteError::Api {
        status: 404,
        body: "{\"error\": \"Session not found\"}".to_string(),
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn base_url(&self) -> &str {
        "scripted"
    }

    async fn create_session(&self, description: &str) -> Result<String, RemoteError> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = format!("session-{}", store.next_id);
        store.sessions.push(StoredSession {
            session: Session {
                id: id.clone(),
                description: description.to_string(),
                mode: Mode::Local,
            },
            documents: Vec::new(),
            history: Vec::new(),
        });
        Ok(id)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, RemoteError> {
        self.check()?;
        let store = self.store.lock().unwrap();
        Ok(store.sessions.iter().map(|s| s.session.clone()).collect())
    }

    async fn delete_session(&self, session_id: &str) -> Result<String, RemoteError> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        let before = store.sessions.len();
        store.sessions.retain(|s| s.session.id != session_id);
        if store.sessions.len() == before {
            return Err(not_found());
        }
        Ok("Session deleted".to_string())
    }

    async fn list_documents(&self, session_id: &str) -> Result<Vec<Document>, RemoteError> {
        if self.store.lock().unwrap().fail_documents.contains(session_id) {
            return Err(RemoteError::Api {
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.with_session(session_id, |s| s.documents.clone())
    }

    async fn upload_document(
        &self,
        session_id: &str,
        _bytes: Vec<u8>,
        filename: &str,
    ) -> Result<String, RemoteError> {
        self.with_session(session_id, |s| s.documents.push(Document::new(filename)))?;
        self.store.lock().unwrap().uploads += 1;
        Ok(format!("{filename} uploaded successfully"))
    }

    async fn delete_document(
        &self,
        session_id: &str,
        filename: &str,
    ) -> Result<String, RemoteError> {
        self.with_session(session_id, |s| {
            s.documents.retain(|d| d.filename != filename)
        })?;
        Ok(format!("{filename} deleted successfully"))
    }

    async fn ask(
        &self,
        session_id: &str,
        question: &str,
        mode: Option<Mode>,
    ) -> Result<String, RemoteError> {
        let answer = format!("answer to: {question}");
        self.with_session(session_id, |s| {
            s.history.push(ChatEntry::new(question, answer.clone()))
        })?;
        self.store.lock().unwrap().asked_modes.push(mode);
        Ok(answer)
    }

    async fn get_history(&self, session_id: &str) -> Result<Vec<ChatEntry>, RemoteError> {
        self.with_session(session_id, |s| s.history.clone())
    }

    async fn switch_mode(&self, session_id: &str, mode: Mode) -> Result<String, RemoteError> {
        self.with_session(session_id, |s| s.session.mode = mode)?;
        Ok(format!("Mode changed to {mode}"))
    }

    async fn search_documents(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<Vec<String>, RemoteError> {
        let query = query.to_lowercase();
        self.with_session(session_id, |s| {
            s.documents
                .iter()
                .filter(|d| d.filename.to_lowercase().contains(&query))
                .map(|d| d.filename.clone())
                .collect()
        })
    }

    async fn search_chat(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<Vec<ChatEntry>, RemoteError> {
        let query = query.to_lowercase();
        self.with_session(session_id, |s| {
            s.history
                .iter()
                .filter(|c| {
                    c.question.to_lowercase().contains(&query)
                        || c.answer.to_lowercase().contains(&query)
                })
                .cloned()
                .collect()
        })
    }
}
