//! Startup provisioning of the DuckDB-WASM files used by the `/client` page.
//!
//! Assets are served from the local static dir so the browser can start the
//! DuckDB worker from the same origin. A missing or empty file is downloaded
//! once into `<name>.tmp` and renamed into place, so a partial download is
//! never visible under the final name. Failures are logged and otherwise
//! ignored: the server still starts, only `/client` is degraded.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

pub const DUCKDB_WASM_CDN: &str = "https://cdn.jsdelivr.net/npm/@duckdb/duckdb-wasm@1.28.0/dist";
pub const WORKER_FILE: &str = "duckdb-browser-mvp.worker.js";
pub const WASM_FILE: &str = "duckdb-browser-mvp.wasm";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{0} returned an empty body")]
    Empty(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file that must exist locally, and where to get it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    pub local_path: PathBuf,
    pub remote_url: String,
}

impl StaticAsset {
    pub fn new<P: Into<PathBuf>>(local_path: P, remote_url: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_url: remote_url.into(),
        }
    }

    /// Present means the file exists and is not empty.
    pub async fn is_present(&self) -> bool {
        fs::metadata(&self.local_path)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.local_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// The worker script and WASM binary, under `<static_dir>/duckdb/`.
pub fn duckdb_wasm_assets(static_dir: &Path) -> Vec<StaticAsset> {
    let dir = static_dir.join("duckdb");
    [WORKER_FILE, WASM_FILE]
        .into_iter()
        .map(|file| StaticAsset::new(dir.join(file), format!("{DUCKDB_WASM_CDN}/{file}")))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Present,
    Downloaded { bytes: usize },
    Failed(String),
}

/// Where asset bytes come from.
pub trait AssetSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpAssetSource {
    client: reqwest::Client,
}

impl HttpAssetSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetSource for HttpAssetSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Make sure every asset exists locally. Never fails; see [`AssetOutcome`].
/// Safe to call on every start: present assets are not fetched again.
pub async fn ensure_assets<S: AssetSource>(assets: &[StaticAsset], source: &S) -> Vec<AssetOutcome> {
    info!(count = assets.len(), "ensuring DuckDB WASM assets are present");
    let mut outcomes = Vec::with_capacity(assets.len());
    for asset in assets {
        if asset.is_present().await {
            outcomes.push(AssetOutcome::Present);
            continue;
        }
        let outcome = match materialize(asset, source).await {
            Ok(bytes) => {
                info!(path = %asset.local_path.display(), bytes, "downloaded asset");
                AssetOutcome::Downloaded { bytes }
            }
            Err(e) => {
                warn!(path = %asset.local_path.display(), url = %asset.remote_url, error = %e, "failed to download asset");
                let _ = fs::remove_file(asset.tmp_path()).await;
                AssetOutcome::Failed(e.to_string())
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

async fn materialize<S: AssetSource>(asset: &StaticAsset, source: &S) -> Result<usize, AssetError> {
    if let Some(parent) = asset.local_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let bytes = source.fetch(&asset.remote_url).await?;
    if bytes.is_empty() {
        return Err(AssetError::Empty(asset.remote_url.clone()));
    }
    let tmp = asset.tmp_path();
    fs::write(&tmp, &bytes).await?;
    fs::rename(&tmp, &asset.local_path).await?;
    Ok(bytes.len())
}
