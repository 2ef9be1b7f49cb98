use std::sync::{Arc, OnceLock};

use axum::{
    extract::{rejection::PathRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    db, error_responses,
    notes::{invalid_note_id, FieldErrors},
};

pub use response::ErrorResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("bad_request: {0}")]
    BadRequest(String),

    #[error("validation: {0}")]
    Validation(FieldErrors),

    #[error("not_found: {0}")]
    NotFound(String),

    #[error("{message}: {source}")]
    Server { message: String, source: db::Error },

    #[error(transparent)]
    Startup(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Maps a store failure: a missing row becomes `NotFound`, anything else a
    /// server error reported with `message`.
    pub fn store(message: &'static str) -> impl FnOnce(db::Error) -> Self {
        move |error| match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            source => Self::Server {
                message: message.into(),
                source,
            },
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// The only path parameter is the note id, so any path rejection is an invalid id.
impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("path rejected: {}", rejection.body_text());
        Self::Validation(invalid_note_id())
    }
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        Self::Startup(Box::new(error))
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Startup(Box::new(error))
    }
}

impl From<envy::Error> for Error {
    fn from(error: envy::Error) -> Self {
        Self::Startup(Box::new(error))
    }
}

// Response

error_responses! {
    bad_request: 400,
    validation: 400,
    not_found: 404,
    server_error: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::BadRequest(message) => errors.bad_request.with_message(message),
            Error::Validation(field_errors) => errors
                .validation
                .with_message(&field_errors.first().message)
                .with_errors(field_errors.clone()),
            Error::NotFound(message) => errors.not_found.with_message(message),
            Error::Server { message, .. } => errors.server_error.with_message(message),
            Error::Startup(_) => errors.server_error.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

impl aide::OperationOutput for Error {
    type Inner = ErrorResponse;
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    match response.extensions().get::<Arc<Error>>().map(Arc::as_ref) {
        Some(error @ (Error::Server { .. } | Error::Startup(_))) => tracing::error!("{error:?}"),
        Some(error) => tracing::debug!("{error}"),
        None => {}
    }

    response
}

mod response {
    use super::*;

    #[derive(Debug, Serialize, Clone, JsonSchema)]
    pub struct ErrorResponse {
        pub success: bool,
        pub error: String,
        pub message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub errors: Option<FieldErrors>,
        #[serde(skip)]
        pub status: u16,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                success: false,
                error: error.into(),
                message: String::new(),
                errors: None,
                status,
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = message.into();
            res
        }

        pub fn with_errors(mut self, errors: FieldErrors) -> Self {
            self.errors = Some(errors);
            self
        }
    }

    /// Typed error responses keyed by kind
    /// ```rust,ignore
    /// error_responses! {
    ///     not_found: 404,
    ///     server_error: 500
    /// }
    /// ```
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::validate_note_id;

    #[test]
    fn status_per_kind() {
        let cases = [
            (Error::bad_request("bad"), 400),
            (Error::Validation(validate_note_id("x").unwrap_err()), 400),
            (Error::not_found("gone"), 404),
            (
                Error::store("Unable to create note")(db::Error::Rusqlite(rusqlite::Error::InvalidQuery)),
                500,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ErrorResponse::from(&error).status, status, "{error:?}");
        }
    }

    #[test]
    fn store_not_found_is_not_a_server_error() {
        let error = Error::store("Unable to delete the note.")(db::Error::NotFound("Note not found in DB.".into()));
        assert!(matches!(error, Error::NotFound(message) if message == "Note not found in DB."));
    }

    #[test]
    fn validation_reports_first_message() {
        let error = Error::Validation(validate_note_id("abc").unwrap_err());
        let body = serde_json::to_value(ErrorResponse::from(&error)).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "id must be a positive integer");
        assert_eq!(body["errors"][0]["path"][0], "id");
        assert!(body.get("status").is_none());
    }
}
