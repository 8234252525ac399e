pub mod bookings;
pub mod jwt;
pub mod services;
pub mod status;

use axum::extract::FromRequest;

use crate::ServerError;
use crate::database::{Document, ID_FIELD};

/// JSON body whose rejection is rendered as a [`ServerError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Body<T>(pub T);

/// Identifiers are assigned by the store, never by the caller.
fn without_id(mut document: Document) -> Document {
    document.remove(ID_FIELD);
    document
}

#[cfg(test)]
pub fn state() -> crate::AppState {
    use std::sync::Arc;

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database::memory(),
        token: crate::token::TokenManager::new(Some("test secret")).unwrap(),
    }
}
