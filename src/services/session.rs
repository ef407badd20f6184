use base64::{Engine as _, engine::general_purpose};
use chrono::Duration;
use tower_cookies::cookie::{SameSite, time::Duration as CookieDuration};
use tower_cookies::{Cookie, Cookies, Key};

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{session::Session, user::User},
};

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Builds the session cookie with the given payload.
fn create_secure_cookie(value: String, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);

    cookie.set_http_only(true);
    if config.secure_cookies {
        cookie.set_secure(true);
    }
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::seconds(config.session_duration_days * 86400));
    cookie.set_path("/");

    cookie
}

fn encode(session: &Session) -> Result<String> {
    let json = sonic_rs::to_string(session)
        .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(json))
}

fn decode(value: &str) -> Option<Session> {
    let json = general_purpose::URL_SAFE_NO_PAD.decode(value).ok()?;
    sonic_rs::from_slice(&json)
        .inspect_err(|e| tracing::warn!("❌ Invalid session payload: {}", e))
        .ok()
}

fn clear(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_max_age(CookieDuration::seconds(0));
    cookie.set_path("/");
    cookies.remove(cookie);
}

/// Issues a signed session for `user`, moving the request from anonymous to
/// authenticated.
pub fn start(cookies: &Cookies, key: &Key, user: &User, config: &Config) -> Result<Session> {
    let session = Session::new(
        user.id,
        user.email.clone(),
        Duration::days(config.session_duration_days),
    );
    cookies
        .signed(key)
        .add(create_secure_cookie(encode(&session)?, config));
    tracing::debug!("🔑 Session issued for {}", session.email);
    Ok(session)
}

/// Reads the current session.
///
/// A missing, tampered, unparseable or expired cookie reads as anonymous.
/// No lookup against the user store happens here.
pub fn current(cookies: &Cookies, key: &Key) -> Option<Session> {
    let cookie = cookies.signed(key).get(SESSION_COOKIE)?;
    let session = decode(cookie.value())?;

    if session.is_expired() {
        tracing::warn!("❌ Session expired for user: {}", session.email);
        clear(cookies);
        return None;
    }

    Some(session)
}

/// Clears the session cookie, returning the session that was active.
pub fn end(cookies: &Cookies, key: &Key) -> Option<Session> {
    let session = current(cookies, key);
    clear(cookies);
    session
}
