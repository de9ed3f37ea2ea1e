use crate::assets::{AssetOutcome, HttpAssetSource, ensure_assets};
use crate::config::EngineConfig;
use crate::fs::{StaticDir, UploadStore};
use crate::http::HttpServer;
use crate::routes::create_router;
use crate::state::AppState;
use axum::Router;
use tracing::{info, warn};

pub struct Engine {
    config: EngineConfig,
    state: AppState,
}

impl Engine {
    /// Create the engine and its data directories.
    pub fn new_with_config(config: EngineConfig) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.uploads_dir)?;
        std::fs::create_dir_all(config.static_dir.join("duckdb"))?;
        let state = AppState::new(
            UploadStore::new(&config.uploads_dir),
            StaticDir::new(&config.static_dir),
        );
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Fetch the DuckDB-WASM files for `/client`. Failures only degrade that page.
    pub async fn provision_assets(&self) -> Vec<AssetOutcome> {
        let outcomes = ensure_assets(&self.config.assets(), &HttpAssetSource::new()).await;
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, AssetOutcome::Failed(_)))
            .count();
        if failed > 0 {
            warn!(failed, "browser viewer assets unavailable; /client will not work");
        }
        outcomes
    }

    pub async fn run(&self) -> std::io::Result<()> {
        if self.config.provision_assets {
            self.provision_assets().await;
        }
        info!(
            uploads = %self.config.uploads_dir.display(),
            static_dir = %self.config.static_dir.display(),
            "starting server"
        );
        HttpServer::new(self.router(), self.config.http())
            .start()
            .await
    }
}
