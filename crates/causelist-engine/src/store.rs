//! Lookup of generated documents by basename, for whatever serves downloads.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
}

pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Map a basename to the file under the output directory. Anything that
    /// is not a plain file name, or is not on disk, is reported as not found.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let not_found = || StoreError::NotFound(name.to_string());

        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(not_found());
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(not_found()),
        }

        let path = self.dir.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(not_found()),
        }
    }
}
