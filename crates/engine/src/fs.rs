use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Extension required for uploaded database files.
pub const DATABASE_EXTENSION: &str = "duckdb";

/// True when `filename` ends in `.duckdb`, ignoring case.
pub fn has_database_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DATABASE_EXTENSION))
}

/// Directory where uploaded databases are kept.
///
/// Every upload gets a fresh `<uuid>.duckdb` name; files are never reused or
/// garbage-collected.
#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a newly generated name and return the full path.
    /// The file is complete when this returns.
    pub fn save(&self, bytes: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let file_id = Uuid::new_v4().simple();
        let path = self.root.join(format!("{file_id}.{DATABASE_EXTENSION}"));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub fn discard(&self, path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Read-only view over the static assets directory.
#[derive(Clone, Debug)]
pub struct StaticDir {
    root: PathBuf,
}

impl StaticDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Map a request path onto a file under the root. Returns `None` for
    /// anything that could escape it (`..`, absolute paths, prefixes).
    pub fn resolve(&self, rel: &str) -> Option<PathBuf> {
        let rel = Path::new(rel);
        if rel.as_os_str().is_empty()
            || !rel.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(rel))
    }

    /// Read a file under the static root.
    pub async fn read_file(&self, rel: &str) -> io::Result<Vec<u8>> {
        let path = self
            .resolve(rel)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path outside static dir"))?;
        fs::read(path).await
    }
}

/// Content type for a static file, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("wasm") => "application/wasm",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
