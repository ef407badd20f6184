use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::current_session,
    models::{product::Product, session::Session},
    services::products as catalog,
    state::AppState,
    validation::product::{ProductForm, parse_product},
};

/// Query parameters of the product list.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductListTemplate {
    pub current_user: Option<String>,
    pub products: Vec<Product>,
    pub query: String,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/detail.html")]
pub struct ProductDetailTemplate {
    pub current_user: Option<String>,
    pub product: Product,
}

/// Create and edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub current_user: Option<String>,
    pub heading: &'static str,
    pub action: String,
    pub form: ProductForm,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn create(actor: &Session, form: ProductForm) -> Self {
        Self {
            current_user: Some(actor.email.clone()),
            heading: "New product",
            action: "/products/create_product".to_string(),
            form,
            error: None,
        }
    }

    fn edit(actor: &Session, id: i32, form: ProductForm) -> Self {
        Self {
            current_user: Some(actor.email.clone()),
            heading: "Edit product",
            action: format!("/products/edit/{}", id),
            form,
            error: None,
        }
    }

    /// Re-renders the form for a validation failure; anything else propagates.
    fn rejected(mut self, err: AppError) -> Result<Response> {
        match err {
            AppError::Validation { message, .. } => {
                self.error = Some(message);
                Ok((StatusCode::BAD_REQUEST, self).into_response())
            }
            other => Err(other),
        }
    }
}

/// Lists products, filtered by `q` when given.
pub async fn index(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<SearchQuery>,
) -> Result<ProductListTemplate> {
    let current_user = current_session(&state, &cookies).await?.map(|s| s.email);
    let products = catalog::list_products(state.products.as_ref(), params.q.as_deref()).await?;

    Ok(ProductListTemplate {
        current_user,
        products,
        query: params.q.unwrap_or_default(),
    })
}

pub async fn detail(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<i32>,
) -> Result<ProductDetailTemplate> {
    let current_user = current_session(&state, &cookies).await?.map(|s| s.email);
    let product = catalog::get_product(state.products.as_ref(), id).await?;
    Ok(ProductDetailTemplate {
        current_user,
        product,
    })
}

pub async fn create_form(Extension(session): Extension<Session>) -> ProductFormTemplate {
    ProductFormTemplate::create(&session, ProductForm::default())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match parse_product(&form) {
        Ok(input) => input,
        Err(e) => return ProductFormTemplate::create(&session, form).rejected(e),
    };

    match catalog::create_product(state.products.as_ref(), input, &session).await {
        Ok(_) => Ok(Redirect::to("/products").into_response()),
        Err(e) => ProductFormTemplate::create(&session, form).rejected(e),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i32>,
) -> Result<ProductFormTemplate> {
    let product = catalog::get_product(state.products.as_ref(), id).await?;
    Ok(ProductFormTemplate::edit(&session, id, ProductForm::from(&product)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i32>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    catalog::get_product(state.products.as_ref(), id).await?;

    let input = match parse_product(&form) {
        Ok(input) => input,
        Err(e) => return ProductFormTemplate::edit(&session, id, form).rejected(e),
    };

    match catalog::update_product(state.products.as_ref(), id, input, &session).await {
        Ok(product) => Ok(Redirect::to(&format!("/products/{}", product.id)).into_response()),
        Err(e) => ProductFormTemplate::edit(&session, id, form).rejected(e),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    catalog::delete_product(state.products.as_ref(), id, &session).await?;
    Ok(Redirect::to("/products"))
}
