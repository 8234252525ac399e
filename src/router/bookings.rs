//! Bookings-related HTTP API.
//!
//! Anyone may book. Reading bookings requires the token cookie and is
//! limited to the caller's own email.

use axum::extract::{Query, State};
use axum::handler::Handler;
use axum::routing::post;
use axum::{Json, Router, middleware};
use tower::ServiceBuilder;

use crate::database::{Collection, Document, Filter, InsertOneResult};
use crate::middleware::{EmailQuery, authenticate, authorize};
use crate::router::{Body, without_id};
use crate::{AppState, ServerError};

/// Field holding the email of the customer who booked.
pub const USER_EMAIL: &str = "userEmail";

/// Handler to book a service. The body is stored verbatim.
pub async fn create(
    State(state): State<AppState>,
    Body(booking): Body<Document>,
) -> Result<Json<InsertOneResult>, ServerError> {
    let result = state
        .db
        .insert_one(Collection::Bookings, without_id(booking))
        .await?;

    tracing::info!(id = %result.inserted_id, "booking created");
    Ok(Json(result))
}

/// Bookings made with the `?email=` address.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>, ServerError> {
    let filter = Filter::eq_or_all(USER_EMAIL, query.email);

    Ok(Json(state.db.find(Collection::Bookings, filter).await?))
}

pub fn router(state: AppState) -> Router<AppState> {
    let guard = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(state, authenticate))
        .layer(middleware::from_fn(authorize));

    Router::new()
        // `POST /bookings` is public, `GET /bookings` goes through the guard.
        .route("/", post(create).get(list.layer(guard)))
}
