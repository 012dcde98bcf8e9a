use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};
use uuid::Uuid;

use super::{NewRecording, RecordingMetadata, RecordingStore, RecordingUpdate};

/// Process-local store. Records are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<RecordingMetadata>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<RecordingMetadata>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<RecordingMetadata>>> {
        self.records
            .read()
            .map_err(|_| anyhow!("recording store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<RecordingMetadata>>> {
        self.records
            .write()
            .map_err(|_| anyhow!("recording store lock poisoned"))
    }
}

fn insert(records: &mut Vec<RecordingMetadata>, recording: NewRecording) -> RecordingMetadata {
    let record = recording.into_metadata();
    records.push(record.clone());
    record
}

fn update_in(records: &mut [RecordingMetadata], id: Uuid, update: RecordingUpdate) -> Result<bool> {
    match records.iter_mut().find(|record| record.recording_id == id) {
        Some(record) => {
            update.apply(record)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn remove_from(records: &mut Vec<RecordingMetadata>, id: Uuid) -> bool {
    let before = records.len();
    records.retain(|record| record.recording_id != id);
    records.len() != before
}

impl RecordingStore for MemoryStore {
    fn save(&self, recording: NewRecording) -> Result<RecordingMetadata> {
        let record = insert(&mut *self.write()?, recording);
        debug!(recording_id = %record.recording_id, score = record.score, "recording saved");
        Ok(record)
    }

    fn get(&self, id: Uuid) -> Result<Option<RecordingMetadata>> {
        Ok(self
            .read()?
            .iter()
            .find(|record| record.recording_id == id)
            .cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<RecordingMetadata>> {
        let records = self.read()?;
        // Later inserts win ties on identical timestamps.
        let mut newest: Vec<RecordingMetadata> = records.iter().rev().cloned().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        newest.truncate(limit);
        Ok(newest)
    }

    fn update(&self, id: Uuid, update: RecordingUpdate) -> Result<bool> {
        let updated = update_in(&mut self.write()?, id, update)?;
        if updated {
            debug!(recording_id = %id, "recording updated");
        }
        Ok(updated)
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = remove_from(&mut *self.write()?, id);
        if removed {
            debug!(recording_id = %id, "recording deleted");
        }
        Ok(removed)
    }
}

/// Memory store mirrored to a pretty-printed JSON file after every change.
///
/// Changes are made on a copy and only become visible once the file is
/// written.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read recording store {:?}", path))?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data)
                    .with_context(|| format!("Failed to parse recording store {:?}", path))?
            }
        } else {
            Vec::new()
        };
        info!(path = %path.display(), records = records.len(), "recording store opened");
        Ok(Self {
            path,
            inner: MemoryStore::from_records(records),
        })
    }

    /// Runs `change` on a staged copy, persisting and committing it only when
    /// `change` reports a modification.
    fn transact<T>(
        &self,
        change: impl FnOnce(&mut Vec<RecordingMetadata>) -> Result<(T, bool)>,
    ) -> Result<T> {
        let mut records = self.inner.write()?;
        let mut staged = records.clone();
        let (value, changed) = change(&mut staged)?;
        if changed {
            self.persist(&staged)?;
            *records = staged;
        }
        Ok(value)
    }

    fn persist(&self, records: &[RecordingMetadata]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory {:?}", parent))?;
        }
        let staging = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(records).context("Failed to serialize recordings")?;
        fs::write(&staging, json)
            .with_context(|| format!("Failed to write recording store {:?}", staging))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace recording store {:?}", self.path))?;
        Ok(())
    }
}

impl RecordingStore for JsonFileStore {
    fn save(&self, recording: NewRecording) -> Result<RecordingMetadata> {
        self.transact(|records| Ok((insert(records, recording), true)))
    }

    fn get(&self, id: Uuid) -> Result<Option<RecordingMetadata>> {
        self.inner.get(id)
    }

    fn list(&self, limit: usize) -> Result<Vec<RecordingMetadata>> {
        self.inner.list(limit)
    }

    fn update(&self, id: Uuid, update: RecordingUpdate) -> Result<bool> {
        self.transact(|records| {
            let updated = update_in(records, id, update)?;
            Ok((updated, updated))
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        self.transact(|records| {
            let removed = remove_from(records, id);
            Ok((removed, removed))
        })
    }
}
