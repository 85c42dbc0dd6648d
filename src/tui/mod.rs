//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//! Everything it shows comes from `ViewState`; everything it does goes
//! through `core::action::update`. Requests returned as `Effect::Spawn`
//! run on the tokio runtime and report back over a channel that the
//! loop drains between frames.
//!
//! ## Focus
//!
//! Two panes take keys: the question input (default) and the sessions
//! sidebar. Tab switches between them. Scroll keys and the global
//! shortcuts (Ctrl+C, Ctrl+R, Ctrl+T) work from either.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (requests in flight or an answer pending): draws every ~80ms
//!   so the spinner and typing indicator move.
//! - **Idle**: sleeps up to 500ms and only redraws on events.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, Request, update};
use crate::core::command::{self, Command};
use crate::core::config::ResolvedConfig;
use crate::core::state::ViewState;
use crate::core::sync;
use crate::core::voice::{self, VoiceCallback, VoiceEvent, VoiceInput};
use crate::remote::{Backend, HttpBackend};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBox, InputEvent, SessionListEvent, SessionListState, TranscriptViewState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives editing and navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub input_box: InputBox,
    pub session_list: SessionListState,
    pub transcript: TranscriptViewState,
    pub focus: Focus,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            input_box: InputBox::new(),
            session_list: SessionListState::new(),
            transcript: TranscriptViewState::new(),
            focus: Focus::Input, // User expects to type immediately
        }
    }
}

/// What a terminal event turned into.
#[derive(Debug)]
enum Routed {
    Nothing,
    Dispatch(Action),
    ToggleVoice,
}

/// Translates one terminal event into work for the loop, updating
/// presentation state (focus, scroll, sidebar cursor) along the way.
fn route(event: TuiEvent, state: &ViewState, tui: &mut TuiState) -> Routed {
    // An open alert swallows everything until dismissed
    if state.alert.is_some() {
        return match event {
            TuiEvent::ForceQuit => Routed::Dispatch(Action::Quit),
            TuiEvent::Submit | TuiEvent::Escape => Routed::Dispatch(Action::DismissAlert),
            _ => Routed::Nothing,
        };
    }

    match event {
        TuiEvent::Resize => return Routed::Nothing,
        TuiEvent::ForceQuit => return Routed::Dispatch(Action::Quit),
        TuiEvent::Refresh => return Routed::Dispatch(Action::Refresh),
        TuiEvent::ToggleVoice => return Routed::ToggleVoice,
        TuiEvent::SwitchFocus => {
            tui.focus = match tui.focus {
                Focus::Input => Focus::Sidebar,
                Focus::Sidebar => Focus::Input,
            };
            tui.session_list.confirm = None;
            return Routed::Nothing;
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.transcript.handle_event(&event);
            return Routed::Nothing;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Sidebar => {
            let tree = state.view_tree();
            match tui.session_list.handle_event(&event, &tree) {
                Some(SessionListEvent::Select(id)) => {
                    tui.focus = Focus::Input;
                    Routed::Dispatch(Action::SelectSession(id))
                }
                Some(SessionListEvent::ToggleMode(id)) => Routed::Dispatch(Action::ToggleMode(id)),
                Some(SessionListEvent::DeleteSession(id)) => {
                    Routed::Dispatch(Action::DeleteSession(Some(id)))
                }
                Some(SessionListEvent::DeleteDocument {
                    session_id,
                    filename,
                }) => Routed::Dispatch(Action::DeleteDocument {
                    session_id: Some(session_id),
                    filename,
                }),
                Some(SessionListEvent::CreateNew) => {
                    Routed::Dispatch(Action::CreateSession(String::new()))
                }
                Some(SessionListEvent::Leave) => {
                    tui.focus = Focus::Input;
                    Routed::Nothing
                }
                None => Routed::Nothing,
            }
        }
        Focus::Input => match event {
            // Up/Down have no meaning in a single question; scroll instead
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                tui.transcript.handle_event(&event);
                Routed::Nothing
            }
            _ => match tui.input_box.handle_event(&event) {
                Some(InputEvent::Submit(text)) => submit(&text, state),
                Some(InputEvent::ContentChanged) | None => Routed::Nothing,
            },
        },
    }
}

fn submit(text: &str, state: &ViewState) -> Routed {
    match command::parse(text) {
        Ok(Command::Voice) => Routed::ToggleVoice,
        Ok(command) => match command.into_action(state.current_session_id.as_deref()) {
            Some(action) => Routed::Dispatch(action),
            None => Routed::Nothing,
        },
        Err(e) => Routed::Dispatch(Action::Reject(e)),
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // The protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // set_cursor_position resets blink timers on each draw
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Runs `request` in the background and sends its result action to the loop.
fn spawn_request(backend: Arc<dyn Backend>, request: Request, tx: mpsc::Sender<Action>) {
    debug!("Spawning request: {:?}", request);
    tokio::spawn(async move {
        let action = sync::execute(backend.as_ref(), request).await;
        if tx.send(action).is_err() {
            warn!("Failed to deliver request result: receiver dropped");
        }
    });
}

/// Applies an action and carries out its effect. Returns true on quit.
fn apply(
    state: &mut ViewState,
    tui: &mut TuiState,
    action: Action,
    backend: &Arc<dyn Backend>,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match update(state, action) {
        Effect::None => false,
        Effect::Spawn(requests) => {
            for request in requests {
                spawn_request(Arc::clone(backend), request, tx.clone());
            }
            false
        }
        Effect::FillInput(text) => {
            tui.input_box.set_text(text);
            tui.focus = Focus::Input;
            false
        }
        Effect::Quit => true,
    }
}

fn voice_callback(tx: mpsc::Sender<Action>) -> VoiceCallback {
    Arc::new(move |event| {
        let action = match event {
            VoiceEvent::Transcript(text) => Action::VoiceTranscript(text),
            VoiceEvent::Ended => Action::VoiceStopped,
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver voice event: receiver dropped");
        }
    })
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config.base_url.clone()));
    let mut state = ViewState::new(backend.base_url());
    let mut tui = TuiState::new();

    // Channel for actions from background tasks and the voice reader
    let (tx, rx) = mpsc::channel();

    let mut voice_input: Box<dyn VoiceInput> = voice::from_config(
        config.voice_command.as_deref(),
        &config.voice_args,
        voice_callback(tx.clone()),
    );
    info!("Voice input available: {}", voice_input.is_available());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    apply(&mut state, &mut tui, Action::Refresh, &backend, &tx);
    if let Some(session_id) = config.default_session.clone() {
        apply(&mut state, &mut tui, Action::SelectSession(session_id), &backend, &tx);
    }

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut shown_session = state.current_session_id.clone();

    'main: loop {
        // A different conversation starts pinned to its newest entry
        if state.current_session_id != shown_session {
            shown_session = state.current_session_id.clone();
            tui.transcript = TranscriptViewState::new();
        }

        let animating = state.is_busy() || state.transcript.is_typing();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &state, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match route(event, &state, &mut tui) {
                Routed::Nothing => continue,
                Routed::Dispatch(action) => action,
                Routed::ToggleVoice => voice::toggle(voice_input.as_mut()),
            };
            if apply(&mut state, &mut tui, action, &backend, &tx) {
                break 'main;
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if apply(&mut state, &mut tui, action, &backend, &tx) {
                break 'main;
            }
        }
    }

    if voice_input.is_listening()
        && let Err(e) = voice_input.stop()
    {
        warn!("Failed to stop voice input: {}", e);
    }
    info!("Shutting down");

    ratatui::restore();
    Ok(())
}
