//! Registration, login and logout.
//!
//! Failed attempts re-render the form with a message; success redirects
//! with 302 Found.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::current_session,
    services::{auth as auth_service, session},
    state::AppState,
};

/// Login form data.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<String>,
    pub msg: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<String>,
    pub msg: Option<String>,
    pub email: String,
}

/// 302 Found, which is what browsers expect after these form posts.
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn current_email(state: &AppState, cookies: &Cookies) -> Result<Option<String>> {
    Ok(current_session(state, cookies).await?.map(|s| s.email))
}

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<RegisterTemplate> {
    Ok(RegisterTemplate {
        current_user: current_email(&state, &cookies).await?,
        msg: None,
        email: String::new(),
    })
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let msg = match auth_service::register(state.users.as_ref(), &form.email, &form.password).await
    {
        Ok(_) => return Ok(found("/login")),
        Err(e @ (AppError::EmailTaken | AppError::Validation { .. })) => e.public_message(),
        Err(e) => {
            tracing::error!("Error creating user {}: {}", form.email, e);
            "Registration failed. Please try again.".to_string()
        }
    };

    Ok(RegisterTemplate {
        current_user: None,
        msg: Some(msg),
        email: form.email.clone(),
    }
    .into_response())
}

/// Display the login page.
pub async fn login_page(State(state): State<AppState>, cookies: Cookies) -> Result<LoginTemplate> {
    Ok(LoginTemplate {
        current_user: current_email(&state, &cookies).await?,
        msg: None,
        email: String::new(),
    })
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let msg = match auth_service::login(state.users.as_ref(), &form.email, &form.password).await {
        Ok(user) => {
            session::start(&cookies, &state.session_key, &user, &state.config)?;
            return Ok(found("/"));
        }
        Err(e @ (AppError::InvalidCredentials | AppError::AccountError(_))) => e.public_message(),
        Err(e) => {
            tracing::error!("Unexpected error in login for {}: {}", form.email, e);
            "Login error. Please try again.".to_string()
        }
    };

    Ok(LoginTemplate {
        current_user: None,
        msg: Some(msg),
        email: form.email.clone(),
    }
    .into_response())
}

/// Clear the session and go home.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Response {
    if let Some(ended) = session::end(&cookies, &state.session_key) {
        tracing::info!("👋 User logged out: {}", ended.email);
    }
    found("/")
}
