// src/lib.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod validation;

pub use config::Config;
pub use db::{PgStore, Store};
pub use error::AppError;

use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    // 跨域完全放开：任意来源、任意方法、任意 header
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // 认证
        .route("/login", post(login_handler))
        // 用户
        .route("/users/:user_id", get(get_user_handler))
        // schedule 路由
        .route("/schedules", get(get_schedules_handler))
        .route("/addschedules", post(add_schedule_handler))
        .route("/editschedules/:schedule_id", put(edit_schedule_handler))
        .route("/deleteschedules/:schedule_id", delete(delete_schedule_handler))
        .with_state(state)
        .layer(cors)
}
