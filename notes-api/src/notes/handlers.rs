use chrono::Utc;

use crate::{ctx::BaseParams, Error, Result};

use super::{CreateNote, CreateOutcome, NewNote, Note, NoteId, UpdateNote};

/// Creates a note unless another note already has the same text.
///
/// The duplicate check scans a snapshot of the collection and is not atomic
/// with the insert: two concurrent creates with the same text can both pass.
pub async fn create_note(CreateNote { text, date }: CreateNote, BaseParams { store, ctx }: BaseParams) -> Result<CreateOutcome> {
    let notes = store
        .get_all()
        .await
        .map_err(Error::store("Unable to retrieve notes from the DB."))?;

    if notes.iter().any(|note| note.text == text) {
        tracing::debug!(request_id = ctx.request_id(), "duplicate note text");
        return Ok(CreateOutcome::Duplicate);
    }

    let note = store
        .create_note(NewNote {
            text,
            date: date.unwrap_or_else(Utc::now),
        })
        .await
        .map_err(Error::store("Unable to create note"))?;

    tracing::info!(request_id = ctx.request_id(), note_id = note.id, "note created");

    Ok(CreateOutcome::Created(note))
}

pub async fn get_note(note_id: NoteId, BaseParams { store, .. }: BaseParams) -> Result<Note> {
    store
        .get_note(note_id)
        .await
        .map_err(Error::store("Error connecting to DB."))?
        .ok_or_else(|| Error::not_found("note not found!"))
}

pub async fn update_note(note_id: NoteId, update: UpdateNote, BaseParams { store, ctx }: BaseParams) -> Result<Note> {
    let note = store
        .get_note(note_id)
        .await
        .map_err(Error::store("Error retrieving notes"))?
        .ok_or_else(|| Error::not_found("note not found"))?;

    let note = update.apply(note);

    store
        .update_note(note.id, note.clone())
        .await
        .map_err(|e| e.not_found_message("note not found"))
        .map_err(Error::store("Error in updating the note"))?;

    tracing::info!(request_id = ctx.request_id(), note_id, "note updated");

    Ok(note)
}

pub async fn delete_note(note_id: NoteId, BaseParams { store, ctx }: BaseParams) -> Result<()> {
    store
        .get_note(note_id)
        .await
        .map_err(Error::store("Unable to retrieve notes from the DB"))?
        .ok_or_else(|| Error::not_found("Note not found in DB."))?;

    store
        .delete_note(note_id)
        .await
        .map_err(|e| e.not_found_message("Note not found in DB."))
        .map_err(Error::store("Unable to delete the note."))?;

    tracing::info!(request_id = ctx.request_id(), note_id, "note deleted");

    Ok(())
}

/// All notes, in id order. Pagination is not supported.
pub async fn find_notes(BaseParams { store, .. }: BaseParams) -> Result<Vec<Note>> {
    store
        .get_all()
        .await
        .map_err(Error::store("Unable to retrieve notes from DB."))
}
