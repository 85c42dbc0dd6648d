//! Blocking message box drawn over everything else.
//!
//! Shown while `ViewState::alert` is set; Enter or Esc dismisses it.
//! The box is sized to the wrapped message, capped at the screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::Component;

const MAX_WIDTH: u16 = 72;
/// Border (2) + horizontal padding (2)
const HORIZONTAL_OVERHEAD: u16 = 4;

pub struct Alert<'a> {
    pub message: &'a str,
}

impl<'a> Alert<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    /// Outer size of the box for a screen of `area`.
    fn size(&self, area: Rect) -> (u16, u16) {
        let longest = self
            .message
            .lines()
            .map(|l| unicode_width::UnicodeWidthStr::width(l) as u16)
            .max()
            .unwrap_or(0);
        let width = (longest + HORIZONTAL_OVERHEAD)
            .clamp(30, MAX_WIDTH)
            .min(area.width);
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD).max(1) as usize;
        let rows: usize = self
            .message
            .lines()
            .map(|l| textwrap::wrap(l, inner).len().max(1))
            .sum();
        let height = (rows as u16 + 2).min(area.height);
        (width, height)
    }
}

impl Component for Alert<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (width, height) = self.size(area);
        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(row);

        frame.render_widget(Clear, popup);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" docent ")
            .title_bottom(Line::from(" Enter/Esc ").centered())
            .padding(Padding::horizontal(1));
        let paragraph = Paragraph::new(self.message)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }
}
