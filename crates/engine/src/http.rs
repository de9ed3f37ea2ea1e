use crate::config::HttpServerConfig;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone)]
pub struct HttpServer {
    router: Router,
    config: HttpServerConfig,
}

impl HttpServer {
    pub fn new(router: Router, config: HttpServerConfig) -> Self {
        Self { router, config }
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.addr()).await?;
        info!(addr = %listener.local_addr()?, "listening");

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    } else {
        // no signal handler available; serve until the process is killed
        std::future::pending::<()>().await;
    }
}
