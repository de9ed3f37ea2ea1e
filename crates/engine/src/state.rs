use crate::fs::{StaticDir, UploadStore};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// The database file queries run against.
///
/// One shared slot for the whole server: unset at start, replaced by every
/// successful upload, never cleared. All clients see the same database.
#[derive(Clone, Debug, Default)]
pub struct CurrentDatabase {
    inner: Arc<RwLock<Option<PathBuf>>>,
}

impl CurrentDatabase {
    pub fn get(&self) -> Option<PathBuf> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point at `path`, returning the previous database if any.
    pub fn replace(&self, path: PathBuf) -> Option<PathBuf> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(path)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// File name of the current database, e.g. `3f2a...e1.duckdb`.
    pub fn name(&self) -> Option<String> {
        self.get().and_then(|p| {
            p.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }
}

/// Shared state handed to every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub current: CurrentDatabase,
    pub uploads: UploadStore,
    pub static_dir: StaticDir,
}

impl AppState {
    pub fn new(uploads: UploadStore, static_dir: StaticDir) -> Self {
        Self {
            current: CurrentDatabase::default(),
            uploads,
            static_dir,
        }
    }
}
