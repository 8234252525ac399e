//! Liveness and public server status.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::config::Configuration;

pub const ALIVE: &str = "Local Tours and Guides server is running";

/// Plain text answer while the server is up.
pub async fn alive() -> &'static str {
    ALIVE
}

/// Structured configuration.
#[derive(Serialize)]
pub struct Status {
    version: String,
    name: String,
}

/// Public server status (configuration).
pub async fn status(State(config): State<Arc<Configuration>>) -> Json<Status> {
    Json(Status {
        version: config.version.clone(),
        name: config.name.clone(),
    })
}
