//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: server, active session + mode badge, status, indicators
//! - `Alert`: blocking message box
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: question / command editor
//! - `SessionList`: sidebar over the `ViewTree`, emits `SessionListEvent`s
//! - `TranscriptView`: scrollable chat
//!
//! Stateful components keep their persistent part (`*State`) in `TuiState`
//! and are wrapped by a short-lived struct each frame that borrows it along
//! with the props.
//!
//! ```text
//! components/
//! ├── mod.rs              (this file)
//! ├── title_bar.rs
//! ├── alert.rs
//! ├── input_box.rs
//! ├── session_list.rs
//! └── transcript_view.rs
//! ```

pub mod alert;
pub mod input_box;
pub mod session_list;
pub mod title_bar;
pub mod transcript_view;

pub use alert::Alert;
pub use input_box::{InputBox, InputEvent};
pub use session_list::{SessionList, SessionListEvent, SessionListState};
pub use title_bar::TitleBar;
pub use transcript_view::{TranscriptView, TranscriptViewState};
