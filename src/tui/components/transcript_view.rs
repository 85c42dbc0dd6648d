//! # TranscriptView Component
//!
//! Scrollable chat for the active session. Each entry is a bordered block
//! titled with its role; bot text goes through the markdown renderer so
//! search hits (`**word**`) stand out. The typing placeholder is drawn as a
//! trailing bot entry.
//!
//! `TranscriptView` is created each frame around `&mut TranscriptViewState`,
//! which keeps the scroll position, the "stick to bottom" flag and a
//! [`LayoutCache`] of measured entry heights between frames.
//!
//! Only entries inside (or half a page around) the viewport are built and
//! drawn. The scrollable area is a `u16` tall, so when a very long history
//! does not fit, the oldest entries are left out of the layout.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{
    Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::{ERROR_MARKER, Entry, Role, TYPING_PLACEHOLDER, Transcript};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

pub struct TranscriptViewState {
    /// First row of the layout shown at the top of the viewport
    pub offset: u16,
    /// When true, new entries scroll into view automatically
    pub stick_to_bottom: bool,
    pub viewport_height: u16,
    pub content_height: u16,
    pub layout: LayoutCache,
}

impl Default for TranscriptViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptViewState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            stick_to_bottom: true,
            viewport_height: 0,
            content_height: 0,
            layout: LayoutCache::new(),
        }
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    fn scroll_up(&mut self, rows: u16) {
        self.offset = self.offset.min(self.max_offset()).saturating_sub(rows);
        self.stick_to_bottom = false;
    }

    /// Re-engages auto-scroll once the user scrolls back to the end.
    fn scroll_down(&mut self, rows: u16) {
        self.offset = self.offset.saturating_add(rows).min(self.max_offset());
        if self.offset >= self.max_offset() {
            self.stick_to_bottom = true;
        }
    }
}

impl EventHandler for TranscriptViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let page = self.viewport_height.max(1);
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => self.scroll_up(1),
            TuiEvent::ScrollDown | TuiEvent::CursorDown => self.scroll_down(1),
            TuiEvent::ScrollPageUp => self.scroll_up(page),
            TuiEvent::ScrollPageDown => self.scroll_down(page),
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
#[derive(Default)]
pub struct LayoutCache {
    /// Height of every transcript entry, in order
    pub heights: Vec<u16>,
    /// Running bottom edge of each entry from `start` on
    pub prefix_heights: Vec<u16>,
    /// First entry that is part of the layout
    pub start: usize,
    revision: u64,
    content_width: u16,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many cached heights are still valid. Appends keep them; a
    /// replaced transcript or a new width does not.
    fn reusable_count(&self, transcript: &Transcript, content_width: u16) -> usize {
        if self.content_width != content_width
            || self.revision != transcript.revision()
            || self.heights.len() > transcript.len()
        {
            return 0;
        }
        self.heights.len()
    }

    /// Measures entries that are not cached yet.
    fn measure(&mut self, transcript: &Transcript, content_width: u16) {
        let reusable = self.reusable_count(transcript, content_width);
        self.heights.truncate(reusable);
        for entry in &transcript.entries()[reusable..] {
            let height = Bubble::from_entry(entry, content_width).height;
            self.heights.push(height);
        }
        self.revision = transcript.revision();
        self.content_width = content_width;
    }

    /// Picks the oldest entry that still fits when `reserved` rows are
    /// needed below the last one, then rebuilds `prefix_heights`.
    fn fit(&mut self, reserved: u16) {
        let budget = u16::MAX.saturating_sub(reserved);
        let mut used = 0u16;
        let mut start = self.heights.len();
        for (idx, &height) in self.heights.iter().enumerate().rev() {
            match used.checked_add(height) {
                Some(total) if total <= budget => {
                    used = total;
                    start = idx;
                }
                _ => break,
            }
        }
        self.start = start;
        self.rebuild_prefix_heights();
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self.heights[self.start..]
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Height of the laid-out entries.
    pub fn entries_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Indices into `prefix_heights` worth drawing for this scroll position.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end.max(start)
    }
}

/// One drawable block with its measured height.
struct Bubble<'a> {
    paragraph: Paragraph<'a>,
    height: u16,
}

impl Bubble<'_> {
    fn new(role: Role, text: &str, width: u16) -> Self {
        let (title, color) = match role {
            Role::User => ("you", Color::Cyan),
            Role::Bot if text.starts_with(ERROR_MARKER) => ("docent", Color::Red),
            Role::Bot => ("docent", Color::Green),
        };
        let body = match role {
            Role::User => Text::styled(text.to_string(), Style::default().fg(color)),
            Role::Bot => markdown::render(text, color),
        };
        let border = Style::default().fg(color).add_modifier(Modifier::DIM);
        let paragraph = Paragraph::new(body)
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(border)
                    .title_style(border),
            )
            .wrap(Wrap { trim: false });
        // line_count adds the block's top/bottom borders but wraps at the
        // width it is given, so pass the inner width
        let height = u16::try_from(paragraph.line_count(width.saturating_sub(2)))
            .unwrap_or(u16::MAX);
        Self { paragraph, height }
    }

    fn from_entry(entry: &Entry, width: u16) -> Self {
        Self::new(entry.role, &entry.text, width)
    }
}

pub struct TranscriptView<'a> {
    pub state: &'a mut TranscriptViewState,
    pub transcript: &'a Transcript,
    pub has_session: bool,
}

impl<'a> TranscriptView<'a> {
    pub fn new(
        state: &'a mut TranscriptViewState,
        transcript: &'a Transcript,
        has_session: bool,
    ) -> Self {
        Self {
            state,
            transcript,
            has_session,
        }
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let hint = if self.has_session {
            "Ask a question about this session's documents.\n/help lists commands."
        } else {
            "Select a session (Tab, then Enter) or create one with /new <description>.\n/help lists commands."
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        let top = area.height / 3;
        let inner = Rect::new(area.x, area.y + top, area.width, area.height - top);
        frame.render_widget(paragraph, inner);
    }
}

impl Component for TranscriptView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.transcript.visible_len() == 0 {
            self.state.content_height = 0;
            self.render_placeholder(frame, area);
            return;
        }

        let [content_area, scrollbar_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let content_width = content_area.width;
        let typing = self
            .transcript
            .is_typing()
            .then(|| Bubble::new(Role::Bot, TYPING_PLACEHOLDER, content_width));
        let typing_height = typing.as_ref().map_or(0, |b| b.height);

        let layout = &mut self.state.layout;
        layout.measure(self.transcript, content_width);
        layout.fit(typing_height);
        let entries_height = layout.entries_height();
        let total_height = entries_height.saturating_add(typing_height);

        self.state.content_height = total_height;
        self.state.viewport_height = area.height;
        let offset = if self.state.stick_to_bottom {
            self.state.max_offset()
        } else {
            self.state.offset.min(self.state.max_offset())
        };
        self.state.offset = offset;

        // Build only the window of rows around the viewport
        let layout = &self.state.layout;
        let range = layout.visible_range(offset, area.height);
        let top_of = |i: usize| if i == 0 { 0 } else { layout.prefix_heights[i - 1] };
        let reaches_end = range.end == layout.prefix_heights.len();
        let window_top = if range.is_empty() {
            entries_height
        } else {
            top_of(range.start)
        };
        let window_bottom = if reaches_end {
            total_height
        } else {
            layout.prefix_heights[range.end - 1]
        };

        let mut window = ScrollView::new(Size::new(
            content_width,
            window_bottom.saturating_sub(window_top),
        ))
        .vertical_scrollbar_visibility(ScrollbarVisibility::Never)
        .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let entries = self.transcript.entries();
        for i in range {
            let idx = layout.start + i;
            let bubble = Bubble::from_entry(&entries[idx], content_width);
            let rect = Rect::new(0, top_of(i) - window_top, content_width, layout.heights[idx]);
            window.render_widget(bubble.paragraph, rect);
        }
        if reaches_end && let Some(bubble) = typing {
            let rect = Rect::new(0, entries_height - window_top, content_width, bubble.height);
            window.render_widget(bubble.paragraph, rect);
        }

        let mut window_state = ScrollViewState::default();
        window_state.set_offset(Position {
            x: 0,
            y: offset.saturating_sub(window_top),
        });
        frame.render_stateful_widget(window, content_area, &mut window_state);

        if total_height > area.height {
            let mut scrollbar_state = ScrollbarState::new(self.state.max_offset() as usize)
                .position(offset as usize)
                .viewport_content_length(area.height as usize);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                scrollbar_area,
                &mut scrollbar_state,
            );
        }
    }
}
