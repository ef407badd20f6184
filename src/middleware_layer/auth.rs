use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    models::session::Session,
    services::session,
    state::AppState,
};

/// Resolves the identity behind the request, if any.
///
/// By default the signed cookie alone decides. With `verify_session_user`
/// the email must also still exist in the user store.
pub async fn current_session(state: &AppState, cookies: &Cookies) -> Result<Option<Session>> {
    let Some(session) = session::current(cookies, &state.session_key) else {
        return Ok(None);
    };

    if state.config.verify_session_user
        && state.users.find_by_email(&session.email).await?.is_none()
    {
        tracing::warn!("❌ Session refers to a missing user: {}", session.email);
        session::end(cookies, &state.session_key);
        return Ok(None);
    }

    Ok(Some(session))
}

/// Turns an optional identity into an authenticated one or `Unauthorized`.
pub fn require_session(session: Option<Session>) -> Result<Session> {
    session.ok_or(AppError::Unauthorized)
}

/// A middleware that requires a valid session to be present.
///
/// On success the `Session` is inserted as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    tracing::debug!("🔐 Checking authentication...");

    let session = require_session(current_session(&state, &cookies).await?)?;

    tracing::debug!("✅ User authenticated: {}", session.email);

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
