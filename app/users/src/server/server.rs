use std::sync::Arc;

use shared::config::ServerConfig;
use tracing::info;

use crate::biz::UserUseCase;
use crate::data::UserRepoImpl;
use crate::{error::UserError, service::UserServiceImpl, Result};

pub struct HttpServer {
    pub cfg: Arc<ServerConfig>,
    pub user_service: UserServiceImpl,
}

impl HttpServer {
    pub fn new(cfg: Arc<ServerConfig>, uuc: Arc<UserUseCase<UserRepoImpl>>) -> Self {
        Self {
            cfg,
            user_service: UserServiceImpl::new(uuc),
        }
    }

    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.cfg.bind_addr()).await?;
        let local_addr = listener.local_addr()?;
        info!("Server is running on {}", local_addr);
        info!("Health check: http://{}/health", local_addr);
        info!("Users API: http://{}/api/users", local_addr);

        let app = self.create_router();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| UserError::ServerError(e.to_string()))?;

        Ok(())
    }
}
