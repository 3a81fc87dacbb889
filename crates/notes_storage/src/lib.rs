use async_trait::async_trait;
use notes_core::{NoteStore, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: NoteStore {
    fn get_error_message() -> &'static str;
    async fn open(config: &StorageConfig) -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("notes.db"),
        }
    }
}

async fn open_backend<T: StorageBackend + 'static>(config: &StorageConfig) -> Result<Arc<dyn NoteStore>> {
    let storage = T::open(config).await.map_err(|e| {
        notes_core::Error::Storage(format!("{} ({})", T::get_error_message(), e))
    })?;
    tracing::debug!("Opened {} note storage", std::any::type_name::<T>().rsplit("::").next().unwrap_or("unknown"));
    Ok(Arc::new(storage))
}

/// Opens the backend named `kind` ("memory", or "sqlite" when built with that feature).
pub async fn create_storage(kind: &str, config: &StorageConfig) -> Result<Arc<dyn NoteStore>> {
    match kind {
        "memory" => open_backend::<MemoryStorage>(config).await,
        #[cfg(feature = "sqlite")]
        "sqlite" => open_backend::<SQLiteStorage>(config).await,
        other => Err(notes_core::Error::Config(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::{create_storage, StorageBackend, StorageConfig};
    pub use super::backends::*;
}
