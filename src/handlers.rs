// src/handlers.rs
use crate::auth::{authenticate, MutationAccess};
use crate::models::{
    AuthResponse,
    CreateScheduleSchema,
    EditScheduleSchema,
    LoginSchema,
    MessageResponse,
    Schedule,
    UserProfile,
};
use crate::validation::{ValidatedJson, ValidatedPath};
use crate::AppError;
use crate::AppState;
use axum::{extract::State, Json};

// --- 1. 登录 (POST /login) ---
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginSchema>,
) -> Result<Json<AuthResponse>, AppError> {
    let result = authenticate(
        state.store.as_ref(),
        state.config.password_scheme,
        &state.config.secret,
        &payload.username,
        &payload.password,
    )
    .await;

    match result {
        Ok(token) => {
            tracing::info!(username = %payload.username, "login succeeded");
            Ok(Json(AuthResponse { token }))
        }
        Err(e) => {
            tracing::warn!(username = %payload.username, "login failed: {}", e);
            Err(e)
        }
    }
}

// --- 2. 查询用户 (GET /users/:user_id) ---
pub async fn get_user_handler(
    ValidatedPath(user_id): ValidatedPath<i32>,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .store
        .find_username(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

// --- 3. 获取列表 (GET /schedules) ---
pub async fn get_schedules_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let schedules = state.store.list_schedules().await?;
    Ok(Json(schedules))
}

// --- 4. 新增 (POST /addschedules) ---
pub async fn add_schedule_handler(
    MutationAccess(caller): MutationAccess,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateScheduleSchema>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.add_schedule(&body).await?;
    tracing::info!(?caller, owner = body.owner(), "schedule added");

    Ok(Json(MessageResponse::new("Schedule added successfully")))
}

// --- 5. 编辑 (PUT /editschedules/:schedule_id) ---
pub async fn edit_schedule_handler(
    ValidatedPath(schedule_id): ValidatedPath<i32>,
    MutationAccess(caller): MutationAccess,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<EditScheduleSchema>,
) -> Result<Json<MessageResponse>, AppError> {
    let affected = state.store.edit_schedule(schedule_id, &body).await?;
    // id 不存在时照样报成功，客户端依赖这个行为
    if affected == 0 {
        tracing::debug!(schedule_id, ?caller, "edit matched no schedule");
    }

    Ok(Json(MessageResponse::new("Schedule updated successfully")))
}

// --- 6. 删除 (DELETE /deleteschedules/:schedule_id) ---
pub async fn delete_schedule_handler(
    ValidatedPath(schedule_id): ValidatedPath<i32>,
    MutationAccess(caller): MutationAccess,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let affected = state.store.delete_schedule(schedule_id).await?;
    if affected == 0 {
        tracing::debug!(schedule_id, ?caller, "delete matched no schedule");
    }

    Ok(Json(MessageResponse::new("Schedule deleted successfully")))
}
