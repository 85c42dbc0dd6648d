//! HTTP implementation of [`Backend`] on top of `reqwest`.
//!
//! JSON in, JSON out. Uploads go as multipart form data with `session_id`
//! and `file` fields. No timeouts or retries are configured.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::backend::{Backend, RemoteError};
use super::types::{
    AskBody, ChatEntry, ChatMatchesResponse, CreateSessionBody, CreateSessionResponse,
    DeleteDocumentBody, Document, DocumentListResponse, DocumentMatchesResponse, HistoryResponse,
    MessageResponse, Mode, SearchBody, Session, SessionIdBody, SwitchModeBody,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        read_json(path, response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, RemoteError> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        read_json(path, response).await
    }
}

/// Reads the whole body, mapping non-2xx statuses to `RemoteError::Api`.
async fn read_body(path: &str, response: reqwest::Response) -> Result<String, RemoteError> {
    let status = response.status();
    debug!("{} -> {}", path, status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("{} failed: {} - {}", path, status.as_u16(), body);
        return Err(RemoteError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .text()
        .await
        .map_err(|e| RemoteError::Network(e.to_string()))
}

async fn read_json<R: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<R, RemoteError> {
    let body = read_body(path, response).await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!("{} returned unparseable body: {}", path, e);
        RemoteError::Parse(e.to_string())
    })
}

/// The `message` field, or `fallback` when the server left it out.
fn message_or(response: MessageResponse, fallback: &str) -> String {
    response
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Pulls the answer out of an `/ask` body.
///
/// Falls back to the raw body when there is no string `answer`, so an
/// unexpected server reply is still shown instead of lost.
fn extract_answer(body: &str) -> Result<String, RemoteError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| RemoteError::Parse(e.to_string()))?;
    Ok(match value.get("answer") {
        Some(serde_json::Value::String(answer)) => answer.clone(),
        Some(serde_json::Value::Null) | None => value.to_string(),
        Some(other) => other.to_string(),
    })
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create_session(&self, description: &str) -> Result<String, RemoteError> {
        let response: CreateSessionResponse = self
            .post_json("/session/create", &CreateSessionBody { description })
            .await?;
        info!("Created session {}", response.session_id);
        Ok(response.session_id)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, RemoteError> {
        let sessions: Vec<Session> = self.get_json("/session/list").await?;
        debug!("Listed {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn delete_session(&self, session_id: &str) -> Result<String, RemoteError> {
        let response: MessageResponse = self
            .post_json("/session/delete", &SessionIdBody { session_id })
            .await?;
        info!("Deleted session {}", session_id);
        Ok(message_or(response, "Session deleted"))
    }

    async fn list_documents(&self, session_id: &str) -> Result<Vec<Document>, RemoteError> {
        let response: DocumentListResponse = self
            .post_json("/document/list", &SessionIdBody { session_id })
            .await?;
        Ok(response.documents)
    }

    async fn upload_document(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<String, RemoteError> {
        info!(
            "Uploading {} ({} bytes) to session {}",
            filename,
            bytes.len(),
            session_id
        );
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("session_id", session_id.to_string())
            .part("file", part);

        let path = "/document/upload";
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let response: MessageResponse = read_json(path, response).await?;
        Ok(message_or(response, "Upload successful"))
    }

    async fn delete_document(
        &self,
        session_id: &str,
        filename: &str,
    ) -> Result<String, RemoteError> {
        let response: MessageResponse = self
            .post_json(
                "/document/delete",
                &DeleteDocumentBody {
                    session_id,
                    filename,
                },
            )
            .await?;
        Ok(message_or(response, &format!("{filename} deleted")))
    }

    async fn ask(
        &self,
        session_id: &str,
        question: &str,
        mode: Option<Mode>,
    ) -> Result<String, RemoteError> {
        let path = "/ask";
        info!(
            "Asking in session {} (mode={:?}, {} chars)",
            session_id,
            mode,
            question.len()
        );
        let response = self
            .client
            .post(self.url(path))
            .json(&AskBody {
                session_id,
                question,
                mode,
            })
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let body = read_body(path, response).await?;
        extract_answer(&body)
    }

    async fn get_history(&self, session_id: &str) -> Result<Vec<ChatEntry>, RemoteError> {
        let response: HistoryResponse = self
            .post_json("/chat/history", &SessionIdBody { session_id })
            .await?;
        Ok(response.chat_history)
    }

    async fn switch_mode(&self, session_id: &str, mode: Mode) -> Result<String, RemoteError> {
        let response: MessageResponse = self
            .post_json("/chat/switch_mode", &SwitchModeBody { session_id, mode })
            .await?;
        info!("Session {} switched to {}", session_id, mode);
        Ok(message_or(response, &format!("Mode changed to {mode}")))
    }

    async fn search_documents(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<Vec<String>, RemoteError> {
        let response: DocumentMatchesResponse = self
            .post_json("/search/documents", &SearchBody { session_id, q: query })
            .await?;
        Ok(response.matches)
    }

    async fn search_chat(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<Vec<ChatEntry>, RemoteError> {
        let response: ChatMatchesResponse = self
            .post_json("/search/chat", &SearchBody { session_id, q: query })
            .await?;
        Ok(response.matches)
    }
}
