//! Give and take back the identity cookie.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::middleware::TOKEN_COOKIE;
use crate::router::Body;
use crate::token::Identity;
use crate::{AppState, ServerError};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
}

/// Cookie readable by the API only, sent on cross-site requests.
fn token_cookie(value: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build()
}

/// Sign the submitted identity and store it in the token cookie.
pub async fn issue(
    State(state): State<AppState>,
    jar: CookieJar,
    Body(identity): Body<Identity>,
) -> Result<(CookieJar, Json<Response>), ServerError> {
    let token = state.token.create(&identity)?;

    tracing::debug!(email = %identity.email, "token issued");
    Ok((jar.add(token_cookie(token)), Json(Response { success: true })))
}

/// Expire the token cookie.
pub async fn log_out(jar: CookieJar) -> (CookieJar, Json<Response>) {
    let mut cookie = token_cookie(String::new());
    cookie.make_removal();

    (jar.add(cookie), Json(Response { success: true }))
}
