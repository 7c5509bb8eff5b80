// src/main.rs
use std::sync::Arc;

use schedule_backend::{app, AppState, Config, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 先读 .env，RUST_LOG 才能对日志过滤生效
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 配置或数据库不可用都在启动时失败，不留到请求里处理
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = match PgStore::connect(&config.db).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to connect to Postgres: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("✅ 数据库连接成功!");

    if !config.mutations_require_token {
        tracing::warn!("schedule add/edit/delete accept requests without a token");
    }

    let addr = config.bind_addr;
    let state = AppState::new(Arc::new(store), config);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("🚀 服务器运行在: {}", addr);

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!("server error: {}", e);
    }
}
