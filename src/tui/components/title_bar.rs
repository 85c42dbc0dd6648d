//! # TitleBar Component
//!
//! Single-line status bar at the top of the screen:
//!
//! ```text
//! docent @ http://127.0.0.1:5000 | Contracts [LOCAL] | 3 sessions | ● rec | ⠋
//! ```
//!
//! Stateless: every field is a prop filled in from `ViewState` each frame.
//! The session segment is omitted when nothing is selected, the recording dot
//! only shows while voice capture runs, and the spinner only while requests
//! are in flight.

use crate::remote::Mode;
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct TitleBar {
    pub base_url: String,
    /// Description and mode of the active session.
    pub session: Option<(String, Mode)>,
    pub status_message: String,
    pub listening: bool,
    pub busy: bool,
    pub spinner_frame: usize,
}

impl TitleBar {
    fn line(&self) -> Line<'static> {
        let sep = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled("docent", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" @ {}", self.base_url)),
        ];

        if let Some((description, mode)) = &self.session {
            spans.push(sep());
            spans.push(Span::raw(format!("{description} ")));
            spans.push(Span::styled(format!("[{}]", mode.badge()), mode_style(*mode)));
        }

        if !self.status_message.is_empty() {
            spans.push(sep());
            spans.push(Span::raw(self.status_message.clone()));
        }

        if self.listening {
            spans.push(sep());
            spans.push(Span::styled("● rec", Style::default().fg(Color::Red)));
        }

        if self.busy {
            spans.push(sep());
            spans.push(Span::styled(
                SPINNER[self.spinner_frame % SPINNER.len()],
                Style::default().fg(Color::Cyan),
            ));
        }

        Line::from(spans)
    }
}

/// Badge color shared by the title bar and the session list.
pub fn mode_style(mode: Mode) -> Style {
    match mode {
        Mode::Local => Style::default().fg(Color::Green),
        Mode::Global => Style::default().fg(Color::Magenta),
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn title(session: Option<(String, Mode)>, listening: bool, busy: bool) -> TitleBar {
        TitleBar {
            base_url: "http://127.0.0.1:5000".to_string(),
            session,
            status_message: "2 sessions".to_string(),
            listening,
            busy,
            spinner_frame: 0,
        }
    }

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_active_session() {
        let text = rendered(&mut title(
            Some(("Contracts".to_string(), Mode::Global)),
            false,
            false,
        ));
        assert!(text.contains("docent @ http://127.0.0.1:5000"));
        assert!(text.contains("Contracts [GLOBAL]"));
        assert!(text.contains("2 sessions"));
        assert!(!text.contains("rec"));
    }

    #[test]
    fn test_title_bar_without_session() {
        let text = rendered(&mut title(None, false, false));
        assert!(!text.contains('['));
    }

    #[test]
    fn test_title_bar_indicators() {
        let text = rendered(&mut title(None, true, true));
        assert!(text.contains("● rec"));
        assert!(text.contains(SPINNER[0]));
    }
}
