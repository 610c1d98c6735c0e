use std::sync::Arc;

use anyhow::{Context, Result};
use shared::config::ServerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use users::biz::UserUseCase;
use users::data::UserRepoImpl;
use users::server;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 初始化环境变量
    shared::init_env();

    // 2. 初始化 tracing
    let tracing_cleanup = shared::init_tracing().context("failed to initialize tracing")?;

    info!("Users HTTP Server starting...");

    // 3. 加载配置
    let cfg = ServerConfig::load().context("failed to load server configuration")?;
    info!(addr = %cfg.addr, port = cfg.port, "Configuration loaded");

    // 4. 设置优雅关闭
    let cancel_token = CancellationToken::new();
    let signal_cancel_token = cancel_token.clone();
    let shutdown_future = cancel_token.cancelled_owned();

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, initiating graceful shutdown...");
        signal_cancel_token.cancel();
    });

    // 5. 构建并启动服务器
    let app = init_app(cfg);
    let server_result = app.run_with_shutdown(shutdown_future).await;

    // 6. 清理资源
    info!("Cleaning up resources...");
    tracing_cleanup.cleanup();

    if let Err(e) = server_result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Users HTTP Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                _ => {
                    error!("Failed to install signal handlers, falling back to CTRL+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
            _ = tokio::signal::ctrl_c() => info!("Received CTRL+C, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for CTRL+C: {}", e);
        }
        info!("Received CTRL+C, shutting down...");
    }
}

fn init_app(cfg: ServerConfig) -> server::HttpServer {
    // data
    let user_repo = UserRepoImpl::new();
    // biz
    let user_uc = Arc::new(UserUseCase::new(user_repo));

    server::HttpServer::new(Arc::new(cfg), user_uc)
}
