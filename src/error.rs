use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum Error {
    // Auth Errors
    AuthFailNoToken,
    AuthFailTokenWrongFormat,
    AuthFailInvalidToken,
    AuthFailCtxNotInRequestExt,

    // Request Errors
    BadRequest(String),
    Forbidden(String),
    NotFound(String),

    // Generic
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Error::AuthFailNoToken => (StatusCode::UNAUTHORIZED, "No auth token found".to_string()),
            Error::AuthFailTokenWrongFormat => (
                StatusCode::UNAUTHORIZED,
                "Auth token wrong format".to_string(),
            ),
            Error::AuthFailInvalidToken => {
                (StatusCode::UNAUTHORIZED, "Invalid auth token".to_string())
            }
            Error::AuthFailCtxNotInRequestExt => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Auth context missing".to_string(),
            ),
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": {
                "message": error_message
            }
        }));

        (status, body).into_response()
    }
}

// Allow conversion from other errors (e.g., anyhow, mongodb) easiest via string
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Internal(err)
    }
}
