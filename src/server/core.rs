use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::auth::{AllowAll, Authorizer, CredentialStore, RequireLogin};
use crate::config::ServerConfig;
use crate::error::FileManagerError;
use crate::server::routes::{AppState, build_router};
use crate::service::FileManager;
use crate::storage::SandboxRoot;

pub struct Server {
    listener: TcpListener,
    router: axum::Router,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Opens the file root (creating it if needed), picks the authorization
    /// policy and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, FileManagerError> {
        let config = Arc::new(config);

        let root = SandboxRoot::open(config.file_root_path())?;

        let credentials = CredentialStore::new(config.auth.users.clone());
        let authorizer: Arc<dyn Authorizer> = if credentials.is_empty() {
            warn!("No users configured: every request is allowed");
            Arc::new(AllowAll)
        } else {
            info!(
                "Login required ({} users, anonymous read {})",
                config.auth.users.len(),
                if config.auth.anonymous_read { "on" } else { "off" }
            );
            Arc::new(RequireLogin {
                anonymous_read: config.auth.anonymous_read,
            })
        };

        let manager = FileManager::new(root, authorizer, &config.url_base);
        let router = build_router(
            AppState::new(manager, credentials),
            config.max_upload_size_bytes(),
        );

        let listener = TcpListener::bind(config.socket_addr()).await?;
        info!("Server bound to {}", config.socket_addr());

        Ok(Self {
            listener,
            router,
            config,
        })
    }

    pub async fn start(self) -> Result<(), FileManagerError> {
        info!(
            "Starting RAX File Manager on http://{}{}/",
            self.config.socket_addr(),
            self.config.url_base
        );

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
