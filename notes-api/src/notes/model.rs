use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type NoteId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// A note that has not been persisted yet; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Timestamps are plain strings in the schema; see `validation::parse_timestamp`.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
pub struct CreateNote {
    #[schemars(length(min = 1))]
    pub text: String,
    #[schemars(with = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct UpdateNote {
    #[schemars(length(min = 1))]
    pub text: Option<String>,
    #[schemars(with = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl UpdateNote {
    /// Fields that were not supplied keep their previous value.
    pub fn apply(self, note: Note) -> Note {
        Note {
            id: note.id,
            text: self.text.unwrap_or(note.text),
            date: self.date.unwrap_or(note.date),
        }
    }
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(Note),
    Duplicate,
}

// Responses

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            message: message.into(),
            note: None,
        }
    }

    /// A message without a `success` flag.
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            success: None,
            message: message.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NoteResponse {
    pub success: bool,
    pub message: String,
    pub note: Note,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NotesResponse {
    pub success: bool,
    pub message: String,
    pub notes: Vec<Note>,
}
