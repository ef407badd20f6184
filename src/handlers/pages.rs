use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::current_session,
    state::AppState,
};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Displays the home page.
pub async fn home(State(state): State<AppState>, cookies: Cookies) -> Result<HomeTemplate> {
    let current_user = current_session(&state, &cookies).await?.map(|s| s.email);
    Ok(HomeTemplate { current_user })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn not_found() -> impl IntoResponse {
    AppError::NotFound
}
