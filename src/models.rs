// src/models.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// --- 1. 用户模型 (只读) ---
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip)]
    pub password: String,
}

/// GET /users/{user_id} 只返回用户名
#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
}

// --- 2. Schedule 模型 ---
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i32,
    pub schedule_date: String,
    pub schedule_description: String,
    pub schedule_header: String,
    pub user_id: i32,
}

/// 未指定归属时使用的用户 ID
pub const DEFAULT_SCHEDULE_OWNER: i32 = 1;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateScheduleSchema {
    pub schedule_date: String,
    pub schedule_description: String,
    pub schedule_header: String,
    // 缺省或显式传 null 都归属 1 号用户
    #[serde(default)]
    pub user_id: Option<i32>,
}

impl CreateScheduleSchema {
    pub fn owner(&self) -> i32 {
        self.user_id.unwrap_or(DEFAULT_SCHEDULE_OWNER)
    }
}

/// 编辑只允许改描述和标题，日期和归属创建后不可变
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditScheduleSchema {
    pub schedule_description: String,
    pub schedule_header: String,
}

// --- 3. 认证模型 ---
#[derive(Debug, Deserialize, Validate)]
pub struct LoginSchema {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}
