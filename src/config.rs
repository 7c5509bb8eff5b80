// src/config.rs
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 密码比对方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    /// users.password 存的是明文，直接在 SQL 里做相等比较（兼容旧数据）
    Plaintext,
    /// users.password 存的是 argon2 PHC 字符串
    Argon2,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub timeout: Duration,
}

impl DbConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        self.with_session_settings(
            PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name),
        )
    }

    /// 每条连接建立时带上 statement_timeout，卡住的查询到时由服务端取消
    pub fn with_session_settings(&self, options: PgConnectOptions) -> PgConnectOptions {
        let statement_timeout = format!("{}ms", self.timeout.as_millis());
        options.options([("statement_timeout", statement_timeout.as_str())])
    }
}

/// 进程级配置：启动时构建一次，之后只读共享
#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub secret: String,
    pub bind_addr: SocketAddr,
    pub password_scheme: PasswordScheme,
    pub mutations_require_token: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = parse(&or_default("DB_PORT", "5432"), "DB_PORT")?;
        let max_connections = parse(&or_default("DB_MAX_CONNECTIONS", "5"), "DB_MAX_CONNECTIONS")?;
        let timeout_secs: u64 = parse(&or_default("DB_TIMEOUT_SECS", "5"), "DB_TIMEOUT_SECS")?;

        let db = DbConfig {
            host: or_default("DB_HOST", "localhost"),
            port,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            name: required("DB_NAME")?,
            max_connections,
            timeout: Duration::from_secs(timeout_secs),
        };

        let bind_addr = parse(&or_default("BIND_ADDR", "127.0.0.1:8000"), "BIND_ADDR")?;

        let password_scheme = match or_default("PASSWORD_SCHEME", "plaintext").to_ascii_lowercase().as_str() {
            "plaintext" => PasswordScheme::Plaintext,
            "argon2" => PasswordScheme::Argon2,
            other => {
                return Err(ConfigError::Invalid {
                    key: "PASSWORD_SCHEME",
                    value: other.to_string(),
                })
            }
        };

        let mutations_require_token = parse_bool(
            &or_default("MUTATIONS_REQUIRE_TOKEN", "false"),
            "MUTATIONS_REQUIRE_TOKEN",
        )?;

        Ok(Config {
            db,
            secret: required("SECRET_KEY")?,
            bind_addr,
            password_scheme,
            mutations_require_token,
        })
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(value: &str, key: &'static str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
