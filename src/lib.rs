//! Server-rendered product catalog: registration, login, signed-cookie
//! sessions and session-guarded product CRUD with search.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod password;
}

pub mod models {
    pub mod product;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod product;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod products;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
    pub mod pages;
    pub mod products;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod product;
}
