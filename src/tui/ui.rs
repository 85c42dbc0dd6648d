use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::ViewState;
use crate::tui::component::Component;
use crate::tui::components::{Alert, SessionList, TitleBar, TranscriptView};
use crate::tui::{Focus, TuiState};

/// Sidebar width in columns; shrinks on narrow terminals.
const SIDEBAR_WIDTH: u16 = 34;

/// ```text
/// ┌──────────────────── title bar (1 row) ───────────────────┐
/// │ sessions sidebar │ transcript                            │
/// │                  │                                       │
/// │                  ├───────────────────────────────────────┤
/// │                  │ input box (3..7 rows)                 │
/// └──────────────────┴───────────────────────────────────────┘
/// ```
pub fn draw_ui(frame: &mut Frame, state: &ViewState, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let [title_area, body_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());
    let sidebar_width = SIDEBAR_WIDTH.min(body_area.width / 3);
    let [sidebar_area, chat_area] =
        Layout::horizontal([Length(sidebar_width), Min(0)]).areas(body_area);

    let input_height = tui.input_box.calculate_height(chat_area.width);
    let [transcript_area, input_area] =
        Layout::vertical([Min(0), Length(input_height)]).areas(chat_area);

    let tree = state.view_tree();
    let active = tree.active();

    TitleBar {
        base_url: state.base_url.clone(),
        session: active.map(|row| (row.description.clone(), row.mode)),
        status_message: state.status_message.clone(),
        listening: state.listening,
        busy: state.is_busy() || state.transcript.is_typing(),
        spinner_frame,
    }
    .render(frame, title_area);

    SessionList::new(&mut tui.session_list, &tree, tui.focus == Focus::Sidebar)
        .render(frame, sidebar_area);

    TranscriptView::new(
        &mut tui.transcript,
        &state.transcript,
        state.current_session_id.is_some(),
    )
    .render(frame, transcript_area);

    tui.input_box.title = match active {
        Some(row) => format!("Ask [{}]", row.badge),
        None => "Ask (no session selected)".to_string(),
    };
    if state.listening {
        tui.input_box.title.push_str(" · listening");
    }
    tui.input_box.dimmed = tui.focus != Focus::Input || state.alert.is_some();
    tui.input_box.render(frame, input_area);

    if let Some(message) = &state.alert {
        Alert::new(message).render(frame, frame.area());
    }
}
