//! Error handler for local-tours.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::database::StoreError;
use crate::token::TokenError;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error("invalid id")]
    InvalidId,

    #[error("store request failed: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("missing or invalid token")]
    Unauthorized,

    #[error("authenticated email does not match")]
    Forbidden,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    #[serde(skip)]
    status: StatusCode,
    message: String,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Update `message` field.
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        match serde_json::to_string(&self) {
            Ok(body) => (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(_) => internal_server_error(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default();

        let response = match &self {
            ServerError::Json(rejection) => response
                .status(rejection.status())
                .message(&rejection.body_text()),

            ServerError::InvalidId => response
                .status(StatusCode::BAD_REQUEST)
                .message("invalid id"),

            ServerError::Unauthorized => response
                .status(StatusCode::UNAUTHORIZED)
                .message("unauthorized access"),

            ServerError::Forbidden => response
                .status(StatusCode::FORBIDDEN)
                .message("forbidden access"),

            ServerError::Store(_) | ServerError::Token(_) => {
                tracing::error!(error = %self, "server returned 500 status");

                response
            },
        };

        response.into_response()
    }
}

fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({ "message": "internal server error" }).to_string(),
    )
        .into_response()
}
