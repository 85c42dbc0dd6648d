//! # Voice Input
//!
//! Optional dictation. A [`VoiceInput`] is started and stopped by the user;
//! while running it reports recognized text through the callback it was
//! built with.
//!
//! [`CommandVoiceInput`] drives an external speech-to-text program that
//! prints one transcript per line on stdout. When no program is configured
//! the app gets a [`NoVoiceInput`], which refuses to start.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::task::AbortHandle;

use crate::core::action::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    /// A finished utterance.
    Transcript(String),
    /// Capture stopped on its own (the program exited).
    Ended,
}

pub type VoiceCallback = Arc<dyn Fn(VoiceEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceError {
    Unavailable(String),
    AlreadyListening,
    NotListening,
    Spawn(String),
}

impl fmt::Display for VoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceError::Unavailable(reason) => write!(f, "{reason}"),
            VoiceError::AlreadyListening => write!(f, "voice capture is already active"),
            VoiceError::NotListening => write!(f, "voice capture is not active"),
            VoiceError::Spawn(e) => write!(f, "failed to start voice command: {e}"),
        }
    }
}

impl std::error::Error for VoiceError {}

pub trait VoiceInput: Send {
    fn is_available(&self) -> bool;
    fn is_listening(&self) -> bool;
    fn start(&mut self) -> Result<(), VoiceError>;
    fn stop(&mut self) -> Result<(), VoiceError>;
}

/// Used when no speech-to-text program is configured.
pub struct NoVoiceInput;

impl VoiceInput for NoVoiceInput {
    fn is_available(&self) -> bool {
        false
    }

    fn is_listening(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<(), VoiceError> {
        Err(VoiceError::Unavailable(
            "no speech-to-text command configured".to_string(),
        ))
    }

    fn stop(&mut self) -> Result<(), VoiceError> {
        Err(VoiceError::NotListening)
    }
}

pub struct CommandVoiceInput {
    program: String,
    args: Vec<String>,
    on_event: VoiceCallback,
    listening: Arc<AtomicBool>,
    reader: Option<AbortHandle>,
}

impl CommandVoiceInput {
    pub fn new(program: impl Into<String>, args: Vec<String>, on_event: VoiceCallback) -> Self {
        Self {
            program: program.into(),
            args,
            on_event,
            listening: Arc::new(AtomicBool::new(false)),
            reader: None,
        }
    }
}

impl VoiceInput for CommandVoiceInput {
    fn is_available(&self) -> bool {
        true
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Spawns the program. Must be called from within a tokio runtime.
    fn start(&mut self) -> Result<(), VoiceError> {
        if self.is_listening() {
            return Err(VoiceError::AlreadyListening);
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Spawn(format!("{}: {e}", self.program)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VoiceError::Spawn("stdout not captured".to_string()))?;

        info!("Voice capture started: {}", self.program);
        self.listening.store(true, Ordering::SeqCst);

        let listening = Arc::clone(&self.listening);
        let on_event = Arc::clone(&self.on_event);
        let task = tokio::spawn(async move {
            // Holding the child here ties its lifetime to this task
            let _child = child;
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let text = line.trim();
                        if !text.is_empty() {
                            debug!("Voice transcript: {}", text);
                            on_event(VoiceEvent::Transcript(text.to_string()));
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Voice output unreadable: {}", e);
                        break;
                    }
                }
            }
            listening.store(false, Ordering::SeqCst);
            on_event(VoiceEvent::Ended);
        });
        self.reader = Some(task.abort_handle());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), VoiceError> {
        let Some(reader) = self.reader.take() else {
            return Err(VoiceError::NotListening);
        };
        // Aborting drops the child, which kills the program
        reader.abort();
        self.listening.store(false, Ordering::SeqCst);
        info!("Voice capture stopped");
        Ok(())
    }
}

impl Drop for CommandVoiceInput {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Picks the voice capability for the configured command, if any.
pub fn from_config(
    command: Option<&str>,
    args: &[String],
    on_event: VoiceCallback,
) -> Box<dyn VoiceInput> {
    match command {
        Some(program) => Box::new(CommandVoiceInput::new(program, args.to_vec(), on_event)),
        None => Box::new(NoVoiceInput),
    }
}

/// Starts capture if idle, stops it if running, and reports the outcome.
pub fn toggle(voice: &mut dyn VoiceInput) -> Action {
    if voice.is_listening() {
        match voice.stop() {
            Ok(()) => Action::VoiceStopped,
            Err(e) => Action::Status(format!("Voice input: {e}")),
        }
    } else {
        match voice.start() {
            Ok(()) => Action::VoiceStarted,
            Err(e) => {
                warn!("Voice input unavailable: {}", e);
                Action::VoiceUnavailable(e.to_string())
            }
        }
    }
}
