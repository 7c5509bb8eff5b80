// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // 登录失败时刻意区分"用户名错误"和"密码错误"，客户端依赖这两个提示
    #[error("Incorrect username")]
    UnknownUser,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,

    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

// 核心逻辑：将错误转换为 HTTP 响应
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Database(ref e) => {
                // 后台记录详细错误，对外只给笼统信息
                tracing::error!("Database Error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                )
            }
            AppError::UnknownUser | AppError::IncorrectPassword => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::ValidationError(ref e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid input: {}", e))
            }
        };

        let body = Json(json!({
            "status": "error",
            "detail": detail,
        }));

        (status, body).into_response()
    }
}
