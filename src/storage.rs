//! Poster store
//!
//! Uploaded posters live in one flat directory as `poster_<id>.png`. A new
//! upload for the same id replaces the old file; the write goes to a temporary
//! sibling first and is renamed into place, so the last completed upload wins.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use hyper::body::Bytes;
use tokio::fs;

use crate::model::MovieId;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PosterStore {
    dir: PathBuf,
}

impl PosterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Deterministic file name for an id
    pub fn file_name(id: &MovieId) -> String {
        format!("poster_{id}.png")
    }

    pub fn path_for(&self, id: &MovieId) -> PathBuf {
        self.dir.join(Self::file_name(id))
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: self.dir.clone(),
                source,
            })
    }

    /// Store poster bytes for `id`, replacing any previous upload
    pub async fn save(&self, id: &MovieId, data: &[u8]) -> Result<PathBuf, StoreError> {
        self.ensure_dir().await?;

        let target = self.path_for(id);
        let tmp = self.dir.join(format!(
            ".{}.{}-{}.tmp",
            Self::file_name(id),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(source) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Write { path: tmp, source });
        }

        if let Err(source) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Write {
                path: target,
                source,
            });
        }

        Ok(target)
    }

    /// Read the stored poster for `id`; `Ok(None)` when nothing was uploaded
    pub async fn load(&self, id: &MovieId) -> Result<Option<Bytes>, StoreError> {
        let path = self.path_for(id);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }
}
