//! Snapshot storage.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use fob_core::error::DomainError;
use tracing::debug;
use uuid::Uuid;

use crate::snapshot::ContestSnapshot;

/// Durable home for snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persists a snapshot and returns where it was written.
    async fn write(&self, snapshot: &ContestSnapshot) -> Result<String, DomainError>;

    /// Reads and verifies a snapshot.
    async fn read(&self, snapshot_id: Uuid) -> Result<ContestSnapshot, DomainError>;

    /// Identifiers of every stored snapshot, oldest first.
    async fn list(&self) -> Result<Vec<Uuid>, DomainError>;
}

fn io_failure(context: &str, path: &Path, err: &std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("{context} {}: {err}", path.display()))
}

/// Writes each snapshot as one JSON file in a directory, named
/// `contest-YYYYMMDD-HHMMSS-<snapshot id>.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Stores snapshots under `dir`, created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The snapshot directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a snapshot.
    #[must_use]
    pub fn file_name(snapshot: &ContestSnapshot) -> String {
        format!(
            "contest-{}-{}.json",
            snapshot.taken_at.format("%Y%m%d-%H%M%S"),
            snapshot.snapshot_id
        )
    }

    async fn file_names(&self) -> Result<Vec<String>, DomainError> {
        let mut names = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(err) => return Err(io_failure("cannot read", &self.dir, &err)),
        };
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| io_failure("cannot read", &self.dir, &e))?
        {
            if let Some(name) = entry.file_name().to_str()
                && name.starts_with("contest-")
                && name.ends_with(".json")
            {
                names.push(name.to_owned());
            }
        }
        // The timestamp prefix makes lexical order chronological.
        names.sort();
        Ok(names)
    }
}

/// Writes `bytes` to `path` and flushes them to disk before returning.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Persists directory entries (the rename) on platforms that allow
/// opening a directory.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn snapshot_id_of(file_name: &str) -> Option<Uuid> {
    let stem = file_name.strip_suffix(".json")?;
    // contest-YYYYMMDD-HHMMSS-<uuid>
    let id = stem.splitn(4, '-').nth(3)?;
    Uuid::parse_str(id).ok()
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn write(&self, snapshot: &ContestSnapshot) -> Result<String, DomainError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_failure("cannot create", &self.dir, &e))?;
        let path = self.dir.join(Self::file_name(snapshot));
        let partial = path.with_extension("json.tmp");
        if let Err(e) = write_synced(&partial, &snapshot.to_json()).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(io_failure("cannot write", &partial, &e));
        }
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| io_failure("cannot rename", &partial, &e))?;
        sync_dir(&self.dir)
            .await
            .map_err(|e| io_failure("cannot sync", &self.dir, &e))?;
        debug!(path = %path.display(), "snapshot written");
        Ok(path.display().to_string())
    }

    async fn read(&self, snapshot_id: Uuid) -> Result<ContestSnapshot, DomainError> {
        let name = self
            .file_names()
            .await?
            .into_iter()
            .find(|name| snapshot_id_of(name) == Some(snapshot_id))
            .ok_or_else(|| DomainError::NotFound(format!("snapshot {snapshot_id}")))?;
        let path = self.dir.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| io_failure("cannot read", &path, &e))?;
        ContestSnapshot::from_json(&bytes)
    }

    async fn list(&self) -> Result<Vec<Uuid>, DomainError> {
        Ok(self
            .file_names()
            .await?
            .iter()
            .filter_map(|name| snapshot_id_of(name))
            .collect())
    }
}

/// Keeps serialized snapshots in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<Vec<(Uuid, Vec<u8>)>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Uuid, Vec<u8>)>> {
        self.snapshots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn write(&self, snapshot: &ContestSnapshot) -> Result<String, DomainError> {
        self.lock().push((snapshot.snapshot_id, snapshot.to_json()));
        Ok(format!("memory:{}", snapshot.snapshot_id))
    }

    async fn read(&self, snapshot_id: Uuid) -> Result<ContestSnapshot, DomainError> {
        let bytes = self
            .lock()
            .iter()
            .find(|(id, _)| *id == snapshot_id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| DomainError::NotFound(format!("snapshot {snapshot_id}")))?;
        ContestSnapshot::from_json(&bytes)
    }

    async fn list(&self) -> Result<Vec<Uuid>, DomainError> {
        Ok(self.lock().iter().map(|(id, _)| *id).collect())
    }
}
