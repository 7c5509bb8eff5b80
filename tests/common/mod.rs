#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    async_trait,
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use schedule_backend::{
    app,
    models::{CreateScheduleSchema, EditScheduleSchema, Schedule, User, UserProfile},
    AppError, AppState, Config, Store,
};
use serde_json::Value;
use tower::util::ServiceExt;

pub const SECRET: &str = "integration-secret";

/// 内存版 Store，行为与 Postgres 实现一致（包括 0 行命中不报错）
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    schedules: Mutex<Vec<Schedule>>,
    next_schedule_id: Mutex<i32>,
}

impl MemoryStore {
    pub fn with_users(users: &[(i32, &str, &str)]) -> Self {
        let store = MemoryStore::default();
        *store.users.lock().unwrap() = users
            .iter()
            .map(|(id, username, password)| User {
                id: *id,
                username: username.to_string(),
                password: password.to_string(),
            })
            .collect();
        store
    }

    pub fn schedule_count(&self) -> usize {
        self.schedules.lock().unwrap().len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned())
    }

    async fn find_username(&self, user_id: i32) -> Result<Option<UserProfile>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == user_id).map(|u| UserProfile {
            username: u.username.clone(),
        }))
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        Ok(self.schedules.lock().unwrap().clone())
    }

    async fn add_schedule(&self, schedule: &CreateScheduleSchema) -> Result<(), AppError> {
        let mut next = self.next_schedule_id.lock().unwrap();
        *next += 1;
        self.schedules.lock().unwrap().push(Schedule {
            id: *next,
            schedule_date: schedule.schedule_date.clone(),
            schedule_description: schedule.schedule_description.clone(),
            schedule_header: schedule.schedule_header.clone(),
            user_id: schedule.owner(),
        });
        Ok(())
    }

    async fn edit_schedule(
        &self,
        schedule_id: i32,
        changes: &EditScheduleSchema,
    ) -> Result<u64, AppError> {
        let mut schedules = self.schedules.lock().unwrap();
        let mut affected = 0;
        for s in schedules.iter_mut().filter(|s| s.id == schedule_id) {
            s.schedule_description = changes.schedule_description.clone();
            s.schedule_header = changes.schedule_header.clone();
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_schedule(&self, schedule_id: i32) -> Result<u64, AppError> {
        let mut schedules = self.schedules.lock().unwrap();
        let before = schedules.len();
        schedules.retain(|s| s.id != schedule_id);
        Ok((before - schedules.len()) as u64)
    }
}

/// 每个操作都像连接池超时一样失败
pub struct FailingStore;

fn pool_timed_out<T>() -> Result<T, AppError> {
    Err(AppError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl Store for FailingStore {
    async fn find_user_by_username(&self, _username: &str) -> Result<Option<User>, AppError> {
        pool_timed_out()
    }

    async fn find_user_by_credentials(
        &self,
        _username: &str,
        _password: &str,
    ) -> Result<Option<User>, AppError> {
        pool_timed_out()
    }

    async fn find_username(&self, _user_id: i32) -> Result<Option<UserProfile>, AppError> {
        pool_timed_out()
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        pool_timed_out()
    }

    async fn add_schedule(&self, _schedule: &CreateScheduleSchema) -> Result<(), AppError> {
        pool_timed_out()
    }

    async fn edit_schedule(
        &self,
        _schedule_id: i32,
        _changes: &EditScheduleSchema,
    ) -> Result<u64, AppError> {
        pool_timed_out()
    }

    async fn delete_schedule(&self, _schedule_id: i32) -> Result<u64, AppError> {
        pool_timed_out()
    }
}

pub fn test_config(overrides: &[(&'static str, &'static str)]) -> Config {
    let mut vars: HashMap<&str, &str> = HashMap::from([
        ("DB_USER", "app"),
        ("DB_PASSWORD", "pw"),
        ("DB_NAME", "planner"),
        ("SECRET_KEY", SECRET),
    ]);
    vars.extend(overrides.iter().copied());
    Config::from_map(&vars).unwrap()
}

pub fn router<S: Store + 'static>(store: Arc<S>, config: Config) -> Router {
    app(AppState::new(store, config))
}

pub fn alice_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_users(&[(7, "alice", "secret"), (8, "bob", "hunter2")]))
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
