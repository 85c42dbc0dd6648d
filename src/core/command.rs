//! Parsing of the text typed into the input box.
//!
//! Plain text is a question. A leading `/` starts a command; see [`HELP`].

use std::path::PathBuf;

use crate::core::action::{Action, ValidationError};
use crate::remote::Mode;

pub const HELP: &str = "\
Commands:
  /new [description]   create a session and make it active
  /delete              delete the active session
  /upload <path>       upload a file to the active session
  /rmdoc <filename>    delete a document from the active session
  /docs <query>        search the active session's documents
  /find <query>        search the active session's chat history
  /mode <local|global> set the active session's mode
  /toggle              flip the active session's mode
  /refresh             reload sessions and documents
  /history             reload the active session's chat history
  /voice               start or stop voice input
  /help                show this help
Anything else is sent as a question.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ask(String),
    New(String),
    Delete,
    Upload(PathBuf),
    RemoveDocument(String),
    SearchDocuments(String),
    SearchChat(String),
    Mode(Mode),
    Toggle,
    Refresh,
    History,
    Voice,
    Help,
}

pub fn parse(input: &str) -> Result<Command, ValidationError> {
    let input = input.trim();
    let Some(rest) = input.strip_prefix('/') else {
        return Ok(Command::Ask(input.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "new" => Command::New(arg.to_string()),
        "delete" => Command::Delete,
        "upload" => Command::Upload(PathBuf::from(required(arg, "/upload <path>")?)),
        "rmdoc" => Command::RemoveDocument(required(arg, "/rmdoc <filename>")?.to_string()),
        "docs" => Command::SearchDocuments(arg.to_string()),
        "find" => Command::SearchChat(arg.to_string()),
        "mode" => {
            let raw = required(arg, "/mode <local|global>")?;
            Command::Mode(raw.parse().map_err(ValidationError::InvalidArgument)?)
        }
        "toggle" => Command::Toggle,
        "refresh" => Command::Refresh,
        "history" => Command::History,
        "voice" => Command::Voice,
        "help" | "?" => Command::Help,
        other => return Err(ValidationError::UnknownCommand(format!("/{other}"))),
    };
    Ok(command)
}

fn required<'a>(arg: &'a str, usage: &'static str) -> Result<&'a str, ValidationError> {
    if arg.is_empty() {
        Err(ValidationError::MissingArgument(usage))
    } else {
        Ok(arg)
    }
}

impl Command {
    /// The action this command stands for. `Voice` is handled by the UI,
    /// which owns the capture device, so it has no action.
    pub fn into_action(self, active_session: Option<&str>) -> Option<Action> {
        let action = match self {
            Command::Ask(question) => Action::Ask(question),
            Command::New(description) => Action::CreateSession(description),
            Command::Delete => Action::DeleteSession(None),
            Command::Upload(path) => Action::Upload(path),
            Command::RemoveDocument(filename) => Action::DeleteDocument {
                session_id: None,
                filename,
            },
            Command::SearchDocuments(query) => Action::SearchDocuments(query),
            Command::SearchChat(query) => Action::SearchChat(query),
            Command::Mode(mode) => Action::SwitchMode(mode),
            Command::Toggle => match active_session {
                Some(id) => Action::ToggleMode(id.to_string()),
                None => Action::Reject(ValidationError::NoActiveSession),
            },
            Command::Refresh => Action::Refresh,
            Command::History => Action::LoadHistory,
            Command::Help => Action::ShowAlert(HELP.to_string()),
            Command::Voice => return None,
        };
        Some(action)
    }
}
