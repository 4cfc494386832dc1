//! Persistence of match blobs.
//!
//! Stores only see opaque strings keyed by [`MatchId`]; encoding is the
//! service's business.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::{MatchId, ServiceError};

/// Key-value storage for serialized matches.
pub trait GameStore: Send + Sync {
    /// Returns the blob saved for `id`, or `None` if there is none.
    fn load(&self, id: MatchId) -> Result<Option<String>, ServiceError>;

    /// Saves `blob` under `id`, replacing any previous value.
    fn save(&self, id: MatchId, blob: &str) -> Result<(), ServiceError>;

    /// Hands out an id no other match in this store uses.
    fn next_id(&self) -> Result<MatchId, ServiceError>;

    /// All stored ids in ascending order.
    fn list(&self) -> Result<Vec<MatchId>, ServiceError>;
}

/// In-process store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<MatchId, String>>,
    next: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, id: MatchId) -> Result<Option<String>, ServiceError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(&id).cloned())
    }

    fn save(&self, id: MatchId, blob: &str) -> Result<(), ServiceError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(id, blob.to_string());
        Ok(())
    }

    fn next_id(&self) -> Result<MatchId, ServiceError> {
        Ok(MatchId(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn list(&self) -> Result<Vec<MatchId>, ServiceError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<MatchId> = blobs.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

/// One `<id>.json` file per match inside a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    next: AtomicU64,
}

impl FileStore {
    /// Opens (creating if needed) the store rooted at `dir`. Id allocation
    /// resumes after the highest id already on disk.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let highest = scan_ids(&dir)?.into_iter().max().map_or(0, |id| id.0);
        debug!(dir = %dir.display(), highest, "opened file store");
        Ok(Self {
            dir,
            next: AtomicU64::new(highest),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: MatchId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl GameStore for FileStore {
    fn load(&self, id: MatchId) -> Result<Option<String>, ServiceError> {
        match fs::read_to_string(self.path_for(id)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, id: MatchId, blob: &str) -> Result<(), ServiceError> {
        // Write then rename so a crash never leaves a truncated record
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn next_id(&self) -> Result<MatchId, ServiceError> {
        Ok(MatchId(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn list(&self) -> Result<Vec<MatchId>, ServiceError> {
        let mut ids = scan_ids(&self.dir)?;
        ids.sort();
        Ok(ids)
    }
}

fn scan_ids(dir: &Path) -> Result<Vec<MatchId>, ServiceError> {
    let mut ids = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(id) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
        {
            ids.push(id);
        }
    }
    Ok(ids)
}
