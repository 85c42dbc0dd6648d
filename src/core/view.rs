//! # Session List View
//!
//! `render(sessions, active_id) -> ViewTree` turns the last-fetched sessions
//! into a presentation-neutral tree. It is rebuilt from scratch on every
//! refresh; nothing is diffed. The TUI draws the tree and maps each row to
//! its actions (select, toggle mode, delete session, delete document).

use crate::core::state::SessionView;
use crate::remote::Mode;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewTree {
    pub sessions: Vec<SessionRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: String,
    pub description: String,
    pub mode: Mode,
    pub badge: &'static str,
    pub active: bool,
    pub documents: Vec<DocumentRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub session_id: String,
    pub filename: String,
}

/// A single line of the flattened tree, in display order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Session(&'a SessionRow),
    Document(&'a SessionRow, &'a DocumentRow),
}

pub fn render(sessions: &[SessionView], active_id: Option<&str>) -> ViewTree {
    let sessions = sessions
        .iter()
        .map(|view| {
            let session = &view.session;
            SessionRow {
                id: session.id.clone(),
                description: session.display_description().to_string(),
                mode: session.mode,
                badge: session.mode.badge(),
                active: active_id == Some(session.id.as_str()),
                documents: view
                    .documents
                    .iter()
                    .map(|doc| DocumentRow {
                        session_id: session.id.clone(),
                        filename: doc.filename.clone(),
                    })
                    .collect(),
            }
        })
        .collect();
    ViewTree { sessions }
}

impl ViewTree {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active(&self) -> Option<&SessionRow> {
        self.sessions.iter().find(|row| row.active)
    }

    /// Sessions followed by their documents, one node per display line.
    pub fn nodes(&self) -> Vec<Node<'_>> {
        let mut nodes = Vec::new();
        for row in &self.sessions {
            nodes.push(Node::Session(row));
            nodes.extend(row.documents.iter().map(|doc| Node::Document(row, doc)));
        }
        nodes
    }
}
