use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dgas_shared::Error;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] Error),

    #[error("authentication required")]
    Unauthenticated,

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Domain(err) => match err {
                Error::AuthenticationFailed => StatusCode::UNAUTHORIZED,
                Error::AccessDenied => StatusCode::FORBIDDEN,
                Error::AccountNotFound | Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::InsufficientCredit
                | Error::SubscriptionInactive
                | Error::SubscriptionExpired
                | Error::InvalidTransition { .. } => StatusCode::CONFLICT,
                Error::AddressMissing | Error::InvalidStatus(_) | Error::Validate(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                Error::User(_) => StatusCode::BAD_REQUEST,
                Error::Persistence(_) | Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::Unauthenticated => "unauthenticated",
            AppError::InternalError(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            tracing::error!(err = ?self, "request failed");
            "An unexpected error occurred. Please try again later.".to_owned()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (status_code, Json(body)).into_response()
    }
}
