//! # Core Application Logic
//!
//! Everything docent knows about sessions, documents and the chat, with no
//! knowledge of any particular UI.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │                         │
//!                    │  • ViewState (app data) │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • render() (ViewTree)  │
//!                    └───────────┬─────────────┘
//!                                │
//!                ┌───────────────┴───────────────┐
//!                ▼                               ▼
//!         ┌────────────┐                  ┌────────────┐
//!         │    TUI     │                  │    sync    │
//!         │  Adapter   │                  │ (Backend   │
//!         │ (ratatui)  │                  │  requests) │
//!         └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `ViewState`, the single owner of client-side data
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`sync`]: executes the requests `update()` asks for
//! - [`view`]: `render(sessions, active_id) -> ViewTree`
//! - [`transcript`]: the chat transcript and typing indicator
//! - [`command`]: slash commands typed into the input box
//! - [`config`]: settings and their override hierarchy
//! - [`voice`]: optional speech-to-text input

pub mod action;
pub mod command;
pub mod config;
pub mod state;
pub mod sync;
pub mod transcript;
pub mod view;
pub mod voice;
