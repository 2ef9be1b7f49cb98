use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{notes::Store, state::AppState};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Everything a note handler needs besides its own input.
#[derive(Clone)]
pub struct BaseParams {
    pub ctx: Ctx,
    pub store: Store,
}

impl BaseParams {
    pub fn new(store: Store, ctx: Ctx) -> Self {
        Self { store, ctx }
    }
}

impl<S> FromRequestParts<S> for BaseParams
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = Ctx::from_request_parts(parts, state).await?;
        let AppState { store } = AppState::from_ref(state);

        Ok(Self { ctx, store })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Ctx {
    pub request_id: Option<String>,
}

impl Ctx {
    pub fn new(request_id: Option<String>) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("-")
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(Self { request_id })
    }
}
