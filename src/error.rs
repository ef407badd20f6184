use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// The connection pool could not hand out a client.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The connection pool could not be built.
    #[error("Pool configuration error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Caller-supplied data violates a domain rule.
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// No authenticated session.
    #[error("Authentication required")]
    Unauthorized,

    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The stored credential for an account is corrupt.
    #[error("Account error: {0}")]
    AccountError(String),

    /// Registration with an email that already has an account.
    #[error("Email already registered")]
    EmailTaken,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The message shown to the client. Backend detail never leaves the server.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::NotFound => "The page or product you asked for does not exist.".to_string(),
            AppError::Unauthorized => "You need to log in to do that.".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::AccountError(_) => "Account error. Please contact support.".to_string(),
            AppError::EmailTaken => "Email already registered.".to_string(),
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::CreatePool(_)
            | AppError::Template(_)
            | AppError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountError(_) => StatusCode::FORBIDDEN,
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::CreatePool(_)
            | AppError::Template(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Generic error page.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
    pub show_login: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Database(ref e) => tracing::error!("Database error: {}", e),
            AppError::Pool(ref e) => tracing::error!("Pool error: {}", e),
            AppError::CreatePool(ref e) => tracing::error!("Pool configuration error: {}", e),
            AppError::Template(ref e) => tracing::error!("Template error: {}", e),
            AppError::Internal(ref msg) => tracing::error!("Internal error: {}", msg),
            AppError::AccountError(ref detail) => tracing::error!("Account error: {}", detail),
            AppError::Unauthorized => tracing::warn!("Unauthenticated request to a protected route"),
            AppError::InvalidCredentials => tracing::warn!("Invalid credentials"),
            AppError::Validation { ref field, ref message } => {
                tracing::debug!("Validation error on {}: {}", field, message)
            }
            AppError::NotFound => tracing::debug!("Resource not found"),
            AppError::EmailTaken => tracing::debug!("Email already registered"),
        }

        let status = self.status();
        let page = ErrorTemplate {
            status: status.as_u16(),
            message: self.public_message(),
            show_login: matches!(self, AppError::Unauthorized),
        };

        (status, page).into_response()
    }
}
