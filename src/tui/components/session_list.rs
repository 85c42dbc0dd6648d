//! # Session List Component
//!
//! Sidebar drawing the `ViewTree`: one row per session (badge + description)
//! followed by its documents, indented. Tab moves focus here.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SessionListState` lives in `TuiState`
//! - `SessionList` is created each frame with borrowed state and the tree
//!
//! Destructive keys need a second press on the same row: `d` for the
//! session, `x` for a document. Any other key cancels the pending confirm.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::core::view::{Node, ViewTree};
use crate::tui::component::Component;
use crate::tui::components::title_bar::mode_style;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    DeleteSession,
    DeleteDocument,
}

/// Persistent state for the sidebar.
#[derive(Default)]
pub struct SessionListState {
    pub selected: usize,
    pub confirm: Option<Confirm>,
    pub list_state: ListState,
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionListEvent {
    Select(String),
    ToggleMode(String),
    DeleteSession(String),
    DeleteDocument { session_id: String, filename: String },
    CreateNew,
    Leave,
}

impl SessionListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the cursor on an existing row after the tree changed.
    pub fn clamp(&mut self, row_count: usize) {
        if row_count == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(row_count - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    /// Handle a key event against the current tree.
    pub fn handle_event(&mut self, event: &TuiEvent, tree: &ViewTree) -> Option<SessionListEvent> {
        let nodes = tree.nodes();
        self.clamp(nodes.len());

        let pending = self.confirm.take();

        match event {
            TuiEvent::Escape => Some(SessionListEvent::Leave),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.clamp(nodes.len());
                None
            }
            TuiEvent::CursorDown => {
                self.selected += 1;
                self.clamp(nodes.len());
                None
            }
            TuiEvent::InputChar('n') => Some(SessionListEvent::CreateNew),
            TuiEvent::Submit => nodes.get(self.selected).map(|node| match node {
                Node::Session(row) | Node::Document(row, _) => {
                    SessionListEvent::Select(row.id.clone())
                }
            }),
            TuiEvent::InputChar('m') => nodes.get(self.selected).map(|node| match node {
                Node::Session(row) | Node::Document(row, _) => {
                    SessionListEvent::ToggleMode(row.id.clone())
                }
            }),
            TuiEvent::InputChar('d') => match nodes.get(self.selected) {
                Some(Node::Session(row)) => {
                    if pending == Some(Confirm::DeleteSession) {
                        Some(SessionListEvent::DeleteSession(row.id.clone()))
                    } else {
                        self.confirm = Some(Confirm::DeleteSession);
                        None
                    }
                }
                _ => None,
            },
            TuiEvent::InputChar('x') => match nodes.get(self.selected) {
                Some(Node::Document(_, doc)) => {
                    if pending == Some(Confirm::DeleteDocument) {
                        Some(SessionListEvent::DeleteDocument {
                            session_id: doc.session_id.clone(),
                            filename: doc.filename.clone(),
                        })
                    } else {
                        self.confirm = Some(Confirm::DeleteDocument);
                        None
                    }
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Transient render wrapper for the sidebar.
pub struct SessionList<'a> {
    state: &'a mut SessionListState,
    tree: &'a ViewTree,
    focused: bool,
}

impl<'a> SessionList<'a> {
    pub fn new(state: &'a mut SessionListState, tree: &'a ViewTree, focused: bool) -> Self {
        Self {
            state,
            tree,
            focused,
        }
    }

    fn help_text(&self) -> &'static str {
        match self.state.confirm {
            Some(Confirm::DeleteSession) => " d again: delete session ",
            Some(Confirm::DeleteDocument) => " x again: delete document ",
            None if self.focused => " ⏎ open  m mode  n new  d/x del ",
            None => " Tab to browse ",
        }
    }
}

impl Component for SessionList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Sessions ")
            .title_bottom(Line::from(self.help_text()).centered())
            .padding(Padding::horizontal(1));

        if self.tree.is_empty() {
            let empty = Paragraph::new("No sessions yet.\nType /new <description>")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let nodes = self.tree.nodes();
        self.state.clamp(nodes.len());

        let items: Vec<ListItem> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let highlighted = self.focused && i == self.state.selected;
                let line = match node {
                    Node::Session(row) => {
                        let name_style = if row.active {
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Gray)
                        };
                        let marker = if row.active { "▸ " } else { "  " };
                        Line::from(vec![
                            Span::styled(marker, name_style),
                            Span::styled(format!("{:<6} ", row.badge), mode_style(row.mode)),
                            Span::styled(row.description.clone(), name_style),
                        ])
                    }
                    Node::Document(_, doc) => Line::from(Span::styled(
                        format!("    · {}", doc.filename),
                        Style::default().fg(Color::DarkGray),
                    )),
                };
                let line = if highlighted {
                    let style = match self.state.confirm {
                        Some(_) => Style::default().fg(Color::Red),
                        None => Style::default(),
                    };
                    line.patch_style(style.add_modifier(Modifier::REVERSED))
                } else {
                    line
                };
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
