use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Retrieval strategy the backend uses to answer a question.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Answer only from the session's uploaded documents (default)
    #[serde(rename = "local")]
    #[default]
    Local,
    /// Answer from general knowledge
    #[serde(rename = "global")]
    Global,
}

impl Mode {
    /// Flips between local and global.
    pub fn toggle(self) -> Mode {
        match self {
            Mode::Local => Mode::Global,
            Mode::Global => Mode::Local,
        }
    }

    /// Wire name, as sent in request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Global => "global",
        }
    }

    /// Badge shown next to a session in the list.
    pub fn badge(self) -> &'static str {
        match self {
            Mode::Local => "LOCAL",
            Mode::Global => "GLOBAL",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Mode::Local),
            "global" => Ok(Mode::Global),
            other => Err(format!("unknown mode '{other}' (expected local or global)")),
        }
    }
}

/// A conversation context on the backend.
///
/// The list endpoint returns raw store documents, so the id arrives as `_id`
/// and the mode may be called `mode` or `current_mode` depending on the
/// server revision. Everything else the store returns is ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "SessionRecord")]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    pub description: String,
    pub mode: Mode,
}

/// A session as stored. Both mode keys may be present; `mode` wins.
#[derive(Deserialize)]
struct SessionRecord {
    #[serde(rename = "_id", alias = "id", alias = "session_id")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    mode: Option<Mode>,
    #[serde(default, deserialize_with = "null_as_default")]
    current_mode: Option<Mode>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.id,
            description: record.description,
            mode: record.mode.or(record.current_mode).unwrap_or_default(),
        }
    }
}

impl Session {
    /// Description for display; blank descriptions get a placeholder.
    pub fn display_description(&self) -> &str {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            "(no description)"
        } else {
            trimmed
        }
    }
}

/// An uploaded file attached to a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub filename: String,
    /// File extension as recorded by the server ("pdf", "txt", "docx").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Document {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind: None,
        }
    }
}

/// One question/answer pair from a session's history (also used for chat search hits).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
}

impl ChatEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Wire bodies
// ============================================================================

#[derive(Serialize, Debug)]
pub(crate) struct CreateSessionBody<'a> {
    pub description: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct SessionIdBody<'a> {
    pub session_id: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct DeleteDocumentBody<'a> {
    pub session_id: &'a str,
    pub filename: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct AskBody<'a> {
    pub session_id: &'a str,
    pub question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

#[derive(Serialize, Debug)]
pub(crate) struct SwitchModeBody<'a> {
    pub session_id: &'a str,
    pub mode: Mode,
}

#[derive(Serialize, Debug)]
pub(crate) struct SearchBody<'a> {
    pub session_id: &'a str,
    pub q: &'a str,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct DocumentListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<Document>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct HistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chat_history: Vec<ChatEntry>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct DocumentMatchesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChatMatchesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<ChatEntry>,
}
