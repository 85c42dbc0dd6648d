//! # Request Execution
//!
//! Turns a [`Request`] into backend calls and wraps the outcome in the
//! matching result [`Action`]. This is the only place in `core` that does I/O.
//!
//! `dispatch` runs the whole update → execute → update cycle to completion,
//! one request at a time. The TUI does not use it; it spawns `execute` on
//! tokio instead so the screen stays responsive.

use std::collections::VecDeque;
use std::path::Path;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, Request, ValidationError, update};
use crate::core::state::{SessionView, ViewState};
use crate::remote::{Backend, RemoteError};

pub async fn execute(backend: &dyn Backend, request: Request) -> Action {
    debug!("Executing {:?}", request);
    match request {
        Request::Refresh => Action::SessionsLoaded(refresh(backend).await),
        Request::CreateSession { description } => {
            Action::SessionCreated(backend.create_session(&description).await)
        }
        Request::DeleteSession { session_id } => {
            let result = backend.delete_session(&session_id).await;
            Action::SessionDeleted { session_id, result }
        }
        Request::Upload { session_id, path } => {
            let (bytes, filename) = match read_upload(&path).await {
                Ok(file) => file,
                Err(e) => return Action::UploadRejected(e),
            };
            Action::DocumentUploaded(backend.upload_document(&session_id, bytes, &filename).await)
        }
        Request::DeleteDocument {
            session_id,
            filename,
        } => {
            let result = backend.delete_document(&session_id, &filename).await;
            Action::DocumentDeleted {
                session_id,
                filename,
                result,
            }
        }
        Request::Ask {
            session_id,
            question,
            mode,
        } => {
            let result = backend.ask(&session_id, &question, mode).await;
            Action::Answered { session_id, result }
        }
        Request::History { session_id } => {
            let result = backend.get_history(&session_id).await;
            Action::HistoryLoaded { session_id, result }
        }
        Request::SwitchMode { session_id, mode } => {
            let result = backend.switch_mode(&session_id, mode).await;
            Action::ModeSwitched {
                session_id,
                mode,
                result,
            }
        }
        Request::SearchDocuments { session_id, query } => {
            Action::DocumentMatches(backend.search_documents(&session_id, &query).await)
        }
        Request::SearchChat { session_id, query } => {
            Action::ChatMatches(backend.search_chat(&session_id, &query).await)
        }
    }
}

/// Fetches every session, then the documents of each one (N+1 requests).
///
/// A failed document fetch is logged and leaves that session's list empty;
/// only a failure of the session list itself fails the refresh.
pub async fn refresh(backend: &dyn Backend) -> Result<Vec<SessionView>, RemoteError> {
    let sessions = backend.list_sessions().await?;

    let fetches = sessions
        .iter()
        .map(|session| backend.list_documents(&session.id));
    let documents = join_all(fetches).await;

    let views: Vec<SessionView> = sessions
        .into_iter()
        .zip(documents)
        .map(|(session, docs)| {
            let documents = docs.unwrap_or_else(|e| {
                warn!("Documents for session {} unavailable: {}", session.id, e);
                Vec::new()
            });
            SessionView { session, documents }
        })
        .collect();

    info!("Refreshed {} sessions", views.len());
    Ok(views)
}

/// Reads an upload from disk, returning its bytes and bare file name.
async fn read_upload(path: &Path) -> Result<(Vec<u8>, String), ValidationError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(ValidationError::MissingFile)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ValidationError::UnreadableFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok((bytes, filename))
}

/// Applies `action` and executes every request it leads to, sequentially,
/// until nothing is left. Returns the effects that need a UI to carry out
/// (`FillInput`, `Quit`).
pub async fn dispatch(state: &mut ViewState, backend: &dyn Backend, action: Action) -> Vec<Effect> {
    let mut pending = VecDeque::from([action]);
    let mut leftover = Vec::new();

    while let Some(action) = pending.pop_front() {
        match update(state, action) {
            Effect::None => {}
            Effect::Spawn(requests) => {
                for request in requests {
                    pending.push_back(execute(backend, request).await);
                }
            }
            other => leftover.push(other),
        }
    }

    leftover
}
