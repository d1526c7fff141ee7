// # File State Store
//
// File-based persistence of the last known IP.
//
// ## Crash Safety
//
// - Atomic writes: the record goes to a sibling `.tmp` file, is fsynced, then
//   renamed over the target, so readers see either the old or the new record
// - Owner-only: the file is created with mode 0600 on Unix
// - No silent recovery: a missing or corrupt file is an error, the operator
//   has to create or fix it
//
// ## File Format
//
// ```json
// {"ip":"1.2.3.4","updated_at":"2025-01-09T12:00:00Z"}
// ```
//
// `updated_at` is optional; `{"ip": ""}` is a valid fresh-install state.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::state_store::{State, StateStore};

impl State {
    /// Read the state record stored at `path`
    ///
    /// # Errors
    ///
    /// `Error::StateStore` if the file cannot be read or parsed.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();

        let content = fs::read(path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            ))
        })?;

        let state: State = serde_json::from_slice(&content).map_err(|e| {
            Error::state_store(format!(
                "Failed to parse state file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!("Loaded state from {}: ip={:?}", path.display(), state.ip);
        Ok(state)
    }

    /// Atomically replace the record stored at `path` with `self`
    ///
    /// On failure the previous file, if any, is left as it was.
    pub async fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();

        let json = serde_json::to_vec(self)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?;

        let temp_path = temp_path(path);
        // A leftover from an interrupted write would keep its old mode.
        let _ = fs::remove_file(&temp_path).await;

        if let Err(e) = write_owner_only(&temp_path, &json).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )));
        }

        tracing::trace!("State written to file: {}", path.display());
        Ok(())
    }
}

/// Create `path` readable and writable by the owner only, and fsync `contents` into it
async fn write_owner_only(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await.map_err(|e| {
        Error::state_store(format!(
            "Failed to create temp file {}: {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(contents).await.map_err(|e| {
        Error::state_store(format!(
            "Failed to write to temp file {}: {}",
            path.display(),
            e
        ))
    })?;

    file.sync_all().await.map_err(|e| {
        Error::state_store(format!(
            "Failed to sync temp file {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// `gdddcd.state` -> `gdddcd.state.tmp`, in the same directory so rename stays atomic
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// File-based state store bound to a single path
///
/// # Example
///
/// ```rust,no_run
/// use gdddcd_core::state::FileStateStore;
/// use gdddcd_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("gdddcd.state");
///
///     let state = store.load().await?;
///     store.write(&state.with_ip("1.2.3.4")).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store for `path`; nothing is read until [`StateStore::load`]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<State, Error> {
        State::load(&self.path).await
    }

    async fn write(&self, state: &State) -> Result<(), Error> {
        state.write(&self.path).await
    }
}
