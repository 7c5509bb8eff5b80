// src/auth.rs
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString
    },
    Argon2,
};
use serde::{Deserialize, Serialize};
use jsonwebtoken::{encode, decode, Header, Algorithm, Validation, EncodingKey, DecodingKey};
use chrono::{DateTime, Duration, Utc};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use crate::config::PasswordScheme;
use crate::db::Store;
use crate::{AppError, AppState};

/// Token 有效期：签发后一小时，不续期、不吊销
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

// --- 1. 密码处理 ---

/// 生成 argon2 哈希，用于在 PASSWORD_SCHEME=argon2 时准备 users.password
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        // 存储的不是合法的 PHC 字符串，属于数据问题而不是用户输错
        tracing::error!("stored password hash is malformed: {}", e);
        AppError::Internal
    })?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

// --- 2. JWT 处理 ---

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub exp: i64,
}

pub fn issue_token(user_id: i32, secret: &str, now: DateTime<Utc>) -> Result<String, AppError> {
    let claims = Claims {
        user_id,
        exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("failed to sign token: {}", e);
        AppError::Internal
    })
}

/// 校验签名和过期时间
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

// --- 3. 登录核心 ---

/// 用户名不存在 -> UnknownUser；用户存在但密码不符 -> IncorrectPassword。
/// 两种失败分开报告是对外的既定行为。
pub async fn authenticate(
    store: &dyn Store,
    scheme: PasswordScheme,
    secret: &str,
    username: &str,
    password: &str,
) -> Result<String, AppError> {
    let Some(user) = store.find_user_by_username(username).await? else {
        return Err(AppError::UnknownUser);
    };

    let user = match scheme {
        PasswordScheme::Plaintext => store
            .find_user_by_credentials(username, password)
            .await?
            .ok_or(AppError::IncorrectPassword)?,
        PasswordScheme::Argon2 => {
            if !verify_password(password, &user.password)? {
                return Err(AppError::IncorrectPassword);
            }
            user
        }
    };

    issue_token(user.id, secret, Utc::now())
}

// --- 4. 认证提取器 ---

pub struct AuthUser {
    pub id: i32,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Auth("Missing or malformed bearer token".into()))?;

        let claims = decode_token(bearer.token(), &state.config.secret).map_err(|e| {
            tracing::warn!("JWT 验证失败: {}", e);
            AppError::Auth("Token expired or invalid".into())
        })?;

        Ok(AuthUser { id: claims.user_id })
    }
}

/// 写接口的访问策略，由 MUTATIONS_REQUIRE_TOKEN 决定：
/// 关闭时任何人都能改任意 schedule；打开时必须带有效 token。
/// 两种情况下都不检查 schedule 的归属。
pub struct MutationAccess(pub Option<i32>);

#[async_trait]
impl FromRequestParts<AppState> for MutationAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.config.mutations_require_token {
            let user = AuthUser::from_request_parts(parts, state).await?;
            return Ok(MutationAccess(Some(user.id)));
        }

        // 开放模式下带了 token 就记录是谁，没带或无效都放行
        let caller = AuthUser::from_request_parts(parts, state).await.ok().map(|u| u.id);
        Ok(MutationAccess(caller))
    }
}
