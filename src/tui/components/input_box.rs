//! # InputBox Component
//!
//! The line where questions and slash commands are typed.
//!
//! Text is wrapped by display width, character by character, so the cursor
//! position can be computed exactly from the byte offset. The box grows up
//! to [`MAX_VISIBLE_LINES`] rows and scrolls internally after that.
//!
//! Props (`title`, `dimmed`) are refreshed by the parent every frame; the
//! buffer and cursor are internal state.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Left + right border.
const HORIZONTAL_OVERHEAD: u16 = 2;
/// Top + bottom border.
const VERTICAL_OVERHEAD: u16 = 2;
pub const MAX_VISIBLE_LINES: u16 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Byte offset into `buffer`
    cursor: usize,
    pub title: String,
    pub dimmed: bool,
}

/// Wrapped rows plus the (row, column) of the cursor.
struct Layout {
    rows: Vec<String>,
    cursor: (u16, u16),
}

fn layout(buffer: &str, cursor: usize, width: u16) -> Layout {
    let width = width.max(1);
    let mut rows = vec![String::new()];
    let mut col = 0u16;
    let mut cursor_at = None;

    for (idx, ch) in buffer.char_indices() {
        if idx == cursor {
            cursor_at = Some((rows.len() as u16 - 1, col));
        }
        if ch == '\n' {
            rows.push(String::new());
            col = 0;
            continue;
        }
        let w = ch.width().unwrap_or(0) as u16;
        if col + w > width {
            rows.push(String::new());
            col = 0;
            // The cursor sat past the last column; it belongs to the new row
            if idx == cursor {
                cursor_at = Some((rows.len() as u16 - 1, 0));
            }
        }
        if let Some(row) = rows.last_mut() {
            row.push(ch);
        }
        col += w;
    }

    let cursor = cursor_at.unwrap_or_else(|| {
        if col >= width {
            rows.push(String::new());
            (rows.len() as u16 - 1, 0)
        } else {
            (rows.len() as u16 - 1, col)
        }
    });
    Layout { rows, cursor }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            title: "Ask".to_string(),
            dimmed: false,
        }
    }

    /// Replace the buffer (voice transcripts land here), cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
    }

    /// Height needed for the current buffer, borders included.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let inner = area_width.saturating_sub(HORIZONTAL_OVERHEAD);
        let rows = layout(&self.buffer, self.cursor, inner).rows.len() as u16;
        rows.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let Layout { rows, cursor } = layout(&self.buffer, self.cursor, inner);

        // Keep the cursor row on screen
        let scroll = cursor.0.saturating_sub(MAX_VISIBLE_LINES - 1);
        let visible: Vec<&str> = rows
            .iter()
            .skip(scroll as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(String::as_str)
            .collect();

        let (text_style, border_style) = if self.dimmed {
            (
                Style::default().fg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (Style::default().fg(Color::Green), Style::default())
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str())
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(
            Paragraph::new(visible.join("\n")).block(block).style(text_style),
            area,
        );

        if !self.dimmed {
            frame.set_cursor_position((
                area.x + 1 + cursor.1,
                area.y + 1 + cursor.0 - scroll,
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(self.cursor, text);
                self.cursor += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = self.prev_boundary();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = self.next_boundary();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit if !self.buffer.trim().is_empty() => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
