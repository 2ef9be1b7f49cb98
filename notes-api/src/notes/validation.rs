//! Request validation, independent of the HTTP layer.
//!
//! Bodies are checked against the JSON schema derived for their input type.
//! Every validator returns either the typed input or a non-empty, ordered list
//! of [`FieldError`]s. The first error is the one reported to clients.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use jsonschema::{error::ValidationErrorKind, JSONSchema, ValidationError};
use lazy_static::lazy_static;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CreateNote, NoteId, UpdateNote};

pub type Validation<T> = std::result::Result<T, FieldErrors>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    InvalidType,
    Required,
    TooSmall,
    InvalidDate,
    InvalidId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub path: Vec<String>,
    pub code: FieldErrorCode,
    pub message: String,
}

impl FieldError {
    fn new(path: &str, code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() { vec![] } else { vec![path.into()] },
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn first(&self) -> &FieldError {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn check(errors: Vec<FieldError>) -> Validation<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.first().message)
    }
}

lazy_static! {
    static ref CREATE_SCHEMA: JSONSchema = compile_schema::<CreateNote>();
    static ref UPDATE_SCHEMA: JSONSchema = compile_schema::<UpdateNote>();
}

fn compile_schema<T: JsonSchema>() -> JSONSchema {
    let schema = serde_json::to_value(schema_for!(T)).expect("derived schema serializes");
    JSONSchema::compile(&schema).expect("derived schema compiles")
}

/// `{ text: non-empty string, date?: timestamp }`
pub fn validate_create(value: &Value) -> Validation<CreateNote> {
    let date = validate_body(&CREATE_SCHEMA, value)?;

    Ok(CreateNote {
        text: string_field(value, "text").unwrap_or_default(),
        date,
    })
}

/// `{ text?: non-empty string, date?: timestamp }`
pub fn validate_update(value: &Value) -> Validation<UpdateNote> {
    let date = validate_body(&UPDATE_SCHEMA, value)?;

    Ok(UpdateNote {
        text: string_field(value, "text"),
        date,
    })
}

pub fn validate_note_id(raw: &str) -> Validation<NoteId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_note_id());
    }

    match raw.parse::<NoteId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid_note_id()),
    }
}

pub fn invalid_note_id() -> FieldErrors {
    FieldError::new("id", FieldErrorCode::InvalidId, "id must be a positive integer").into()
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` in UTC or a bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Checks `value` against `schema`, then parses the optional `date`, which the
/// schema only knows as a string.
fn validate_body(schema: &JSONSchema, value: &Value) -> Validation<Option<DateTime<Utc>>> {
    let mut errors = match schema.validate(value) {
        Ok(()) => vec![],
        Err(errors) => errors.map(FieldError::from).collect(),
    };

    let date = match value.get("date").and_then(Value::as_str) {
        None => None,
        Some(raw) => {
            let date = parse_timestamp(raw);
            if date.is_none() {
                errors.push(FieldError::new(
                    "date",
                    FieldErrorCode::InvalidDate,
                    "date must be a valid timestamp",
                ));
            }
            date
        }
    };

    FieldErrors::check(errors)?;

    Ok(date)
}

fn string_field(value: &Value, name: &str) -> Option<String> {
    value.get(name).and_then(Value::as_str).map(String::from)
}

impl From<ValidationError<'_>> for FieldError {
    fn from(error: ValidationError<'_>) -> Self {
        let path = error
            .instance_path
            .to_string()
            .split('/')
            .filter(|chunk| !chunk.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        let field = path.last().cloned();

        match (&error.kind, field) {
            (ValidationErrorKind::Required { property }, _) => {
                let name = property.as_str().unwrap_or_default().to_string();
                Self {
                    path: [path.clone(), vec![name.clone()]].concat(),
                    code: FieldErrorCode::Required,
                    message: format!("{name} is required"),
                }
            }
            (ValidationErrorKind::Type { .. }, None) => Self {
                message: format!("Expected object, received {}", type_name(&error.instance)),
                path,
                code: FieldErrorCode::InvalidType,
            },
            (ValidationErrorKind::MinLength { .. }, Some(field)) => Self {
                message: format!("{field} must not be empty"),
                path,
                code: FieldErrorCode::TooSmall,
            },
            (_, field) => Self {
                message: format!("{}: {error}", field.as_deref().unwrap_or("body")),
                path,
                code: FieldErrorCode::InvalidType,
            },
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
