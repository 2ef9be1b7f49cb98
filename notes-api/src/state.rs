use axum::extract::FromRef;

use crate::notes::Store;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub store: Store,
}
