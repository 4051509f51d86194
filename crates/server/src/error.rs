use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use routescope_api::{ErrorBody, InvocationError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invocation failure rendered as `{error}` with its HTTP status.
#[derive(Debug)]
pub struct HttpError(pub InvocationError);

impl From<InvocationError> for HttpError {
    fn from(err: InvocationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json_response(status, &ErrorBody::new(self.0.to_string()))
    }
}

/// JSON body with the permissive CORS origin every response carries.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}

/// Map an extractor rejection onto the invocation taxonomy.
pub(crate) fn rejected(status: StatusCode, text: String) -> InvocationError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        InvocationError::PayloadTooLarge(text)
    } else {
        InvocationError::BadRequest(text)
    }
}
