use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use super::dto::Envelope;
use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum UserError {
    /// Token missing or rejected. Reported as 500 for compatibility with existing callers.
    #[error("{message}")]
    Unauthenticated {
        message: &'static str,
        #[source]
        source: AuthError,
    },

    #[error("User not found")]
    NotFound(String),

    #[error("Failed to fetch the list")]
    EmptyPage,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Unauthenticated { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::EmptyPage => StatusCode::BAD_REQUEST,
            UserError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let message = match &self {
            UserError::Unauthenticated { message, source } => {
                warn!(error = %source, "authentication failed");
                (*message).to_string()
            }
            UserError::NotFound(id) => {
                warn!(user_id = %id, "user not found");
                self.to_string()
            }
            UserError::Internal(e) => {
                error!(error = %format!("{e:#}"), "users request failed");
                "Something went wrong".to_string()
            }
            UserError::EmptyPage | UserError::Validation(_) => self.to_string(),
        };

        (self.status(), Json(Envelope::failure(message))).into_response()
    }
}
