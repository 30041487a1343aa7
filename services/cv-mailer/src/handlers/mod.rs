use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cv_mailer_utils::{ErrorResponse, MailerError};

pub mod config;
pub mod health;
pub mod send;

pub use config::*;
pub use health::*;
pub use send::*;

/// Error returned by handlers; rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError(pub MailerError);

impl From<MailerError> for ApiError {
    fn from(error: MailerError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}
