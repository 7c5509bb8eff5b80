// src/db.rs
use axum::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};

use crate::config::DbConfig;
use crate::models::{CreateScheduleSchema, EditScheduleSchema, Schedule, User, UserProfile};
use crate::AppError;

/// 数据访问层。每个方法对应一次逻辑操作，最多两条语句。
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// 用户名和密码同时相等才返回（明文比较）
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError>;

    async fn find_username(&self, user_id: i32) -> Result<Option<UserProfile>, AppError>;

    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError>;

    async fn add_schedule(&self, schedule: &CreateScheduleSchema) -> Result<(), AppError>;

    /// 返回受影响行数；id 不存在时为 0，不算错误
    async fn edit_schedule(
        &self,
        schedule_id: i32,
        changes: &EditScheduleSchema,
    ) -> Result<u64, AppError>;

    async fn delete_schedule(&self, schedule_id: i32) -> Result<u64, AppError>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DbConfig) -> Result<Self, sqlx::Error> {
        Self::connect_with(config, config.connect_options()).await
    }

    /// 连接参数由调用方给出（例如从 DATABASE_URL 解析），池大小和超时仍取自 config
    pub async fn connect_with(config: &DbConfig, options: PgConnectOptions) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 为一次读操作取出一条连接。连接在 drop 时归还，包括 `?` 提前返回的路径。
    async fn connection(&self) -> Result<PoolConnection<Postgres>, AppError> {
        Ok(self.pool.acquire().await?)
    }

    /// 写操作走事务，调用方必须显式 commit；未提交就 drop 会回滚。
    async fn transaction(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.connection().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let mut conn = self.connection().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = $1 AND password = $2",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    async fn find_username(&self, user_id: i32) -> Result<Option<UserProfile>, AppError> {
        let mut conn = self.connection().await?;
        let profile = sqlx::query_as::<_, UserProfile>("SELECT username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(profile)
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        let mut conn = self.connection().await?;
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT id, schedule_date, schedule_description, schedule_header, user_id FROM schedules",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(schedules)
    }

    async fn add_schedule(&self, schedule: &CreateScheduleSchema) -> Result<(), AppError> {
        let mut tx = self.transaction().await?;
        sqlx::query(
            "INSERT INTO schedules (schedule_date, schedule_description, schedule_header, user_id)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&schedule.schedule_date)
        .bind(&schedule.schedule_description)
        .bind(&schedule.schedule_header)
        .bind(schedule.owner())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn edit_schedule(
        &self,
        schedule_id: i32,
        changes: &EditScheduleSchema,
    ) -> Result<u64, AppError> {
        let mut tx = self.transaction().await?;
        let result = sqlx::query(
            "UPDATE schedules SET schedule_description = $1, schedule_header = $2 WHERE id = $3",
        )
        .bind(&changes.schedule_description)
        .bind(&changes.schedule_header)
        .bind(schedule_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn delete_schedule(&self, schedule_id: i32) -> Result<u64, AppError> {
        let mut tx = self.transaction().await?;
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(schedule_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
