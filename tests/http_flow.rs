//! End-to-end tests of the HTTP surface over the in-memory store.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use zeroize::Zeroizing;

use catalog::{config::Config, routes, state::AppState};

fn test_config() -> Config {
    Config {
        database_url: "memory".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        session_duration_days: 7,
        session_secret: Zeroizing::new(vec![42u8; 64]),
        secure_cookies: false,
        static_dir: "static".into(),
        verify_session_user: false,
    }
}

fn test_app(config: &Config) -> (Router, AppState) {
    let state = AppState::in_memory(config).expect("state");
    (routes::router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// The `session=...` pair from the response, ready for a `Cookie` header.
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn register_and_login(app: &Router, email_form: &str) -> String {
    let body = format!("email={}&password=secret123", email_form);
    let registered = send(app, post_form("/register", &body, None)).await;
    assert_eq!(registered.status(), StatusCode::FOUND);

    let logged_in = send(app, post_form("/login", &body, None)).await;
    assert_eq!(logged_in.status(), StatusCode::FOUND);
    session_cookie(&logged_in).expect("session cookie")
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = test_app(&test_config());
    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn register_login_logout_login_again() {
    let (app, _) = test_app(&test_config());

    let registered = send(
        &app,
        post_form("/register", "email=a%40x.com&password=secret123", None),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::FOUND);
    assert_eq!(location(&registered), "/login");

    let logged_in = send(
        &app,
        post_form("/login", "email=a%40x.com&password=secret123", None),
    )
    .await;
    assert_eq!(logged_in.status(), StatusCode::FOUND);
    assert_eq!(location(&logged_in), "/");
    let cookie = session_cookie(&logged_in).expect("session cookie");

    let home = send(&app, get("/", Some(&cookie))).await;
    assert!(body_text(home).await.contains("a@x.com"));

    let logged_out = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(logged_out.status(), StatusCode::FOUND);
    assert_eq!(location(&logged_out), "/");
    let cleared = logged_out
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("session=") && v.contains("Max-Age=0"));
    assert!(cleared, "logout must expire the session cookie");

    let anonymous_home = send(&app, get("/", None)).await;
    assert!(!body_text(anonymous_home).await.contains("a@x.com"));

    let again = send(
        &app,
        post_form("/login", "email=a%40x.com&password=secret123", None),
    )
    .await;
    assert_eq!(again.status(), StatusCode::FOUND);
    assert!(session_cookie(&again).is_some());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_render_the_same_message() {
    let (app, _) = test_app(&test_config());
    register_and_login(&app, "a%40x.com").await;

    let wrong = send(
        &app,
        post_form("/login", "email=a%40x.com&password=wrong-pass", None),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::OK);
    assert!(session_cookie(&wrong).is_none());
    let wrong_body = body_text(wrong).await;

    let unknown = send(
        &app,
        post_form("/login", "email=b%40x.com&password=secret123", None),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::OK);
    let unknown_body = body_text(unknown).await;

    assert!(wrong_body.contains("Invalid credentials"));
    assert!(unknown_body.contains("Invalid credentials"));
}

#[tokio::test]
async fn duplicate_registration_is_reported_without_a_second_row() {
    let (app, state) = test_app(&test_config());
    register_and_login(&app, "a%40x.com").await;

    let again = send(
        &app,
        post_form("/register", "email=a%40x.com&password=different1", None),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
    assert!(body_text(again).await.contains("Email already registered."));

    // The first password still works, so the row was not replaced.
    let login = send(
        &app,
        post_form("/login", "email=a%40x.com&password=secret123", None),
    )
    .await;
    assert_eq!(login.status(), StatusCode::FOUND);
    assert!(state.users.find_by_email("a@x.com").await.unwrap().is_some());
}

#[tokio::test]
async fn anonymous_mutations_are_unauthorized_and_change_nothing() {
    let (app, state) = test_app(&test_config());

    let create = send(
        &app,
        post_form(
            "/products/create_product",
            "name=Widget&description=&price=1&stock=1",
            None,
        ),
    )
    .await;
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.products.count().await.unwrap(), 0);

    let form = send(&app, get("/products/create_product", None)).await;
    assert_eq!(form.status(), StatusCode::UNAUTHORIZED);

    let delete = send(&app, post_form("/products/delete/1", "", None)).await;
    assert_eq!(delete.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_session_cookie_is_anonymous() {
    let (app, state) = test_app(&test_config());
    let cookie = register_and_login(&app, "a%40x.com").await;
    let tampered = format!("{}x", cookie);

    let create = send(
        &app,
        post_form(
            "/products/create_product",
            "name=Widget&price=1",
            Some(&tampered),
        ),
    )
    .await;
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.products.count().await.unwrap(), 0);
}

#[tokio::test]
async fn create_search_edit_delete() {
    let (app, state) = test_app(&test_config());
    let cookie = register_and_login(&app, "a%40x.com").await;

    let created = send(
        &app,
        post_form(
            "/products/create_product",
            "name=+Widget+&description=Blue+and+sturdy&price=9.99&stock=5",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/products");

    let stored = state.products.list(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Widget");
    let id = stored[0].id;

    let hit = body_text(send(&app, get("/products?q=Widg", None)).await).await;
    assert!(hit.contains("Widget"));
    let miss = body_text(send(&app, get("/products?q=zzz", None)).await).await;
    assert!(!miss.contains("Widget"));
    assert!(miss.contains("No products found."));

    let detail = send(&app, get(&format!("/products/{}", id), None)).await;
    assert_eq!(detail.status(), StatusCode::OK);
    assert!(body_text(detail).await.contains("9.99"));

    let edit_form = send(&app, get(&format!("/products/edit/{}", id), Some(&cookie))).await;
    assert_eq!(edit_form.status(), StatusCode::OK);
    assert!(body_text(edit_form).await.contains("Widget"));

    let updated = send(
        &app,
        post_form(
            &format!("/products/edit/{}", id),
            "name=Gadget&description=Red&price=12.5&stock=0",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&updated), format!("/products/{}", id));
    let product = state.products.find(id).await.unwrap().unwrap();
    assert_eq!(product.id, id);
    assert_eq!(product.name, "Gadget");
    assert_eq!(product.price, 12.5);

    let deleted = send(
        &app,
        post_form(&format!("/products/delete/{}", id), "", Some(&cookie)),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&deleted), "/products");
    assert_eq!(state.products.count().await.unwrap(), 0);

    let gone = send(&app, get(&format!("/products/{}", id), None)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_product_input_rerenders_the_form() {
    let (app, state) = test_app(&test_config());
    let cookie = register_and_login(&app, "a%40x.com").await;

    let negative = send(
        &app,
        post_form(
            "/products/create_product",
            "name=Widget&price=-1&stock=1",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
    let body = body_text(negative).await;
    assert!(body.contains("Price must be zero or greater."));
    assert!(body.contains("Widget"));
    assert_eq!(state.products.count().await.unwrap(), 0);

    let not_a_number = send(
        &app,
        post_form(
            "/products/create_product",
            "name=Widget&price=cheap",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(not_a_number.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.products.count().await.unwrap(), 0);

    let no_price = send(
        &app,
        post_form("/products/create_product", "name=Widget", Some(&cookie)),
    )
    .await;
    assert_eq!(no_price.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(no_price).await.contains("Price must be a number."));
    assert_eq!(state.products.count().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_update_of_a_missing_product_is_not_found() {
    let (app, _state) = test_app(&test_config());
    let cookie = register_and_login(&app, "a%40x.com").await;

    let update = send(
        &app,
        post_form("/products/edit/999", "name=&price=-1", Some(&cookie)),
    )
    .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_products_are_not_found_for_every_route() {
    let (app, state) = test_app(&test_config());
    let cookie = register_and_login(&app, "a%40x.com").await;

    let detail = send(&app, get("/products/999", None)).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    let edit = send(&app, get("/products/edit/999", Some(&cookie))).await;
    assert_eq!(edit.status(), StatusCode::NOT_FOUND);

    let update = send(
        &app,
        post_form("/products/edit/999", "name=X&price=1", Some(&cookie)),
    )
    .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let delete = send(&app, post_form("/products/delete/999", "", Some(&cookie))).await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.products.count().await.unwrap(), 0);
}

#[tokio::test]
async fn session_of_a_vanished_user_is_rejected_when_verification_is_on() {
    let mut config = test_config();
    config.verify_session_user = true;

    let (first_app, _) = test_app(&config);
    let cookie = register_and_login(&first_app, "a%40x.com").await;

    // Same signing key, empty user store.
    let (second_app, _) = test_app(&config);
    let form = send(&second_app, get("/products/create_product", Some(&cookie))).await;
    assert_eq!(form.status(), StatusCode::UNAUTHORIZED);

    let still_valid = send(&first_app, get("/products/create_product", Some(&cookie))).await;
    assert_eq!(still_valid.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_render_the_not_found_page() {
    let (app, _) = test_app(&test_config());
    let response = send(&app, get("/no/such/page", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Error 404"));
}
