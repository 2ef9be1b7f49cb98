use aide::{OperationInput, OperationIo, OperationOutput};
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::FromRequestParts;
use serde::Serialize;
use serde_json::Value;

pub use aide;
pub use aide::openapi::OpenApi;

pub use axum::Json;

#[derive(FromRequestParts, OperationIo)]
#[from_request(via(axum::extract::Path), rejection(crate::Error))]
#[aide(input_with = "axum::extract::Path<T>", json_schema)]
pub struct Path<T>(pub T);

/// Request body buffered as-is. Parsing is left to the handler so that JSON
/// errors can be reported in the order each endpoint needs.
pub struct JsonBody(pub Bytes);

impl JsonBody {
    pub fn parse(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.0)
    }
}

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = crate::Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Bytes::from_request(req, state)
            .await
            .map(Self)
            .map_err(|rejection| crate::Error::bad_request(rejection.body_text()))
    }
}

impl OperationInput for JsonBody {}

/// JSON body sent with an explicit status code.
pub struct WithStatus<T>(pub StatusCode, pub T);

impl<T> IntoResponse for WithStatus<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.0, axum::Json(self.1)).into_response()
    }
}

impl<T> OperationOutput for WithStatus<T> {
    type Inner = T;
}
