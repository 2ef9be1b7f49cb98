mod handlers;
mod model;
mod routes;
pub mod store;
mod validation;

pub use model::*;
pub use store::{NoteStore, SqliteNoteStore, Store};
pub use validation::{invalid_note_id, validate_create, validate_note_id, validate_update, FieldErrors};

use crate::{openapi::aide::axum::ApiRouter, state::AppState};

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new().merge(routes::router(state.clone()))
}
