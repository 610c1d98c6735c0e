use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response as AxumResponse},
};
use thiserror::Error;
use tracing::error;

use crate::biz::FieldError;
use crate::service::response::Response;

#[derive(Error, Debug, Clone)]
pub enum UserError {
    #[error("Invalid user data: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid user id: {0}")]
    MalformedId(String),

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::Validation(_) | UserError::MalformedId(_) | UserError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::InternalError(_) | UserError::ServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> AxumResponse {
        let status = self.status_code();
        let body = match self {
            UserError::Validation(errors) => Response::<()>::failed("Invalid data")
                .set_errors(errors.iter().map(ToString::to_string).collect()),
            UserError::NotFound(_) => Response::failed("User not found"),
            UserError::MalformedId(_) => Response::failed("Invalid ID"),
            UserError::InvalidBody(_) => Response::failed("Invalid JSON body"),
            UserError::InternalError(ref message) | UserError::ServerError(ref message) => {
                error!("Unhandled error: {}", message);
                Response::failed("Internal server error")
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for UserError {
    fn from(err: std::io::Error) -> Self {
        UserError::InternalError(err.to_string())
    }
}
