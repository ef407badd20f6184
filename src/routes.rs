use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    handlers::{auth, pages, products},
    middleware_layer,
    state::AppState,
};

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/products/create_product",
            get(products::create_form).post(products::create),
        )
        .route(
            "/products/edit/{id}",
            get(products::edit_form).post(products::update),
        )
        .route("/products/delete/{id}", post(products::delete))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ));

    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/health", get(pages::health))
        .route("/favicon.ico", get(pages::favicon))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::detail))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(pages::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
