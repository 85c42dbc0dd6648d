use std::fmt;

use async_trait::async_trait;

use super::types::{ChatEntry, Document, Mode, Session};

/// Errors that can occur while talking to the backend.
/// None of them are retried; the caller re-issues the action to try again.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, DNS, reset).
    Network(String),
    /// The server answered with a non-success status.
    Api { status: u16, body: String },
    /// A success response whose body could not be understood.
    Parse(String),
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Network(msg) => write!(f, "network error: {msg}"),
            RemoteError::Api { status, body } => write!(f, "HTTP {status}: {body}"),
            RemoteError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// The document Q&A server, one method per endpoint.
///
/// Every call issues exactly one request: at-most-once, no retry, no caching.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base URL requests are sent to, for display.
    fn base_url(&self) -> &str;

    /// Creates a session and returns its id.
    async fn create_session(&self, description: &str) -> Result<String, RemoteError>;

    async fn list_sessions(&self) -> Result<Vec<Session>, RemoteError>;

    async fn delete_session(&self, session_id: &str) -> Result<String, RemoteError>;

    async fn list_documents(&self, session_id: &str) -> Result<Vec<Document>, RemoteError>;

    /// Uploads `bytes` as `filename` and returns the server's confirmation message.
    async fn upload_document(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<String, RemoteError>;

    async fn delete_document(&self, session_id: &str, filename: &str)
    -> Result<String, RemoteError>;

    /// Asks a question. `mode` is omitted from the request when `None`.
    async fn ask(
        &self,
        session_id: &str,
        question: &str,
        mode: Option<Mode>,
    ) -> Result<String, RemoteError>;

    async fn get_history(&self, session_id: &str) -> Result<Vec<ChatEntry>, RemoteError>;

    /// Persists a session's mode on the server.
    async fn switch_mode(&self, session_id: &str, mode: Mode) -> Result<String, RemoteError>;

    /// Returns highlighted document lines containing `query`.
    async fn search_documents(&self, session_id: &str, query: &str)
    -> Result<Vec<String>, RemoteError>;

    /// Returns highlighted history entries containing `query`.
    async fn search_chat(&self, session_id: &str, query: &str)
    -> Result<Vec<ChatEntry>, RemoteError>;
}
