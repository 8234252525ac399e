//! Middlewares for routes.
//!
//! Guarded routes run [`authenticate`] then [`authorize`] before reaching
//! their handler.

use axum::Extension;
use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::token::Identity;

/// Name of the cookie carrying the identity token.
pub const TOKEN_COOKIE: &str = "token";

/// `?email=` query accepted by routes scoped to one user.
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Check the identity token and expose its claims to the next stages.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let Some(token) = jar.get(TOKEN_COOKIE).map(|cookie| cookie.value().to_owned()) else {
        tracing::debug!("request without token cookie");
        return Err(ServerError::Unauthorized);
    };

    let identity = state.token.decode(&token).map_err(|err| {
        tracing::debug!(error = %err, "rejected token");
        ServerError::Unauthorized
    })?;

    req.extensions_mut().insert::<Identity>(identity);
    Ok(next.run(req).await)
}

/// Only let a user read data scoped to their own email.
pub async fn authorize(
    Extension(identity): Extension<Identity>,
    Query(query): Query<EmailQuery>,
    req: Request,
    next: Next,
) -> Result<Response> {
    if query.email.as_deref() != Some(identity.email.as_str()) {
        tracing::debug!(email = %identity.email, requested = ?query.email, "forbidden access");
        return Err(ServerError::Forbidden);
    }

    Ok(next.run(req).await)
}
