use crate::{
    ctx::BaseParams,
    openapi::{
        aide::{
            axum::{routing::get_with, ApiRouter, IntoApiResponse},
            NoApi,
        },
        Json, JsonBody, Path, WithStatus,
    },
    state::AppState,
    Error, Result,
};
use axum::http::StatusCode;

use schemars::JsonSchema;

use serde::Deserialize;

use super::{
    handlers, validate_create, validate_note_id, validate_update, CreateNote, CreateOutcome, MessageResponse,
    NoteResponse, NotesResponse, UpdateNote,
};

#[derive(Debug, Deserialize, JsonSchema)]
struct NoteIdPath {
    /// Positive integer note id.
    id: String,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/",
            get_with(find_notes, |t| t.summary("List all notes")).post_with(create_note, |t| {
                t.summary("Create a note")
                    .input::<Json<CreateNote>>()
                    .response::<200, Json<MessageResponse>>()
            }),
        )
        .api_route(
            "/{id}",
            get_with(get_note, |t| t.summary("Get a note"))
                .put_with(update_note, |t| {
                    t.summary("Update a note")
                        .input::<Json<UpdateNote>>()
                        .response::<200, Json<MessageResponse>>()
                })
                .delete_with(delete_note, |t| t.summary("Delete a note")),
        )
        .with_state(state)
}

async fn find_notes(NoApi(base): NoApi<BaseParams>) -> impl IntoApiResponse {
    match handlers::find_notes(base).await {
        Ok(notes) => WithStatus(
            StatusCode::OK,
            NotesResponse {
                success: true,
                message: "Successfully retrieved".into(),
                notes,
            },
        ),
        Err(error) => {
            tracing::error!("{error:?}");
            WithStatus(
                StatusCode::INTERNAL_SERVER_ERROR,
                NotesResponse {
                    success: false,
                    message: "Unable to retrieve notes from DB.".into(),
                    notes: vec![],
                },
            )
        }
    }
}

async fn create_note(NoApi(base): NoApi<BaseParams>, body: JsonBody) -> Result<Json<MessageResponse>> {
    let data = body.parse().map_err(|e| {
        tracing::debug!("invalid create body: {e}");
        Error::bad_request("The request body JSON is Invalid")
    })?;
    let args = validate_create(&data)?;

    let response = match handlers::create_note(args, base).await? {
        CreateOutcome::Created(note) => MessageResponse::success("Note creation SUCCESSFULL!").with_note(note),
        CreateOutcome::Duplicate => MessageResponse::notice("The same note already exists in DB"),
    };

    Ok(Json(response))
}

async fn get_note(Path(NoteIdPath { id }): Path<NoteIdPath>, NoApi(base): NoApi<BaseParams>) -> Result<Json<NoteResponse>> {
    let note_id = validate_note_id(&id)?;

    let note = handlers::get_note(note_id, base).await?;

    Ok(Json(NoteResponse {
        success: true,
        message: "note found".into(),
        note,
    }))
}

/// The body is parsed before the id is validated.
async fn update_note(
    Path(NoteIdPath { id }): Path<NoteIdPath>,
    NoApi(base): NoApi<BaseParams>,
    body: JsonBody,
) -> Result<Json<MessageResponse>> {
    let data = body.parse().map_err(|e| {
        tracing::debug!("invalid update body: {e}");
        Error::bad_request("Invalid JSON in the request body")
    })?;
    let note_id = validate_note_id(&id)?;
    let args = validate_update(&data)?;

    handlers::update_note(note_id, args, base).await?;

    Ok(Json(MessageResponse::success("successfully updated")))
}

async fn delete_note(Path(NoteIdPath { id }): Path<NoteIdPath>, NoApi(base): NoApi<BaseParams>) -> Result<Json<MessageResponse>> {
    let note_id = validate_note_id(&id)?;

    handlers::delete_note(note_id, base).await?;

    Ok(Json(MessageResponse::success("Note deleted")))
}
