//! # HTTP 服务
//!
//! - `GET /` 引用页面，语言选择和“新引用”按钮都请求 `/quote`
//! - `GET /quote?lang=xx` 纯文本引用或错误文本
//! - `GET /hearts?aspect=A&ticks=N` 背景动画的初始一批帧
//! - `POST /hearts` 从上一批的状态继续模拟，保证动画连续
//! - `GET /health` 健康检查
//!
//! 选取逻辑只在服务端实现一次，页面不再自己挑选引用。

pub mod page;
pub mod routes;

use anyhow::Result;
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::quotes::QuoteService;
use routes::{
    continue_hearts_handler, health_handler, hearts_handler, index_handler, quote_handler,
};

/// 所有请求共享的只读状态
#[derive(Debug, Clone)]
pub struct AppState {
    pub quotes: QuoteService,
}

impl AppState {
    pub fn new(quotes: QuoteService) -> Arc<Self> {
        Arc::new(Self { quotes })
    }
}

pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/quote", get(quote_handler))
        .route("/hearts", get(hearts_handler).post(continue_hearts_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60));
        app.layer(cors)
    } else {
        app
    }
}

pub async fn start_server(config: &ServerConfig, quotes: QuoteService) -> Result<()> {
    info!("📂 引用文件: {:?}", quotes.store_path());
    let state = AppState::new(quotes);
    let app = router(state, config.enable_cors);

    let address = format!("{}:{}", config.host, config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("绑定 {} 失败: {}", address, e))?;
    info!("🌐 服务已启动: http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 服务已关闭");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
