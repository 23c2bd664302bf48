#![deny(warnings)]

//! Persistence layer: a narrow `SnapshotStore` seam the engine writes
//! periodic `SimulationSnapshot` blobs through, plus the file-backed and
//! in-memory implementations of it.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by a `SnapshotStore` implementation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot blob for key {0:?} is corrupt")]
    Corrupt(String),
    #[error("no snapshot stored for key {0:?}")]
    NotFound(String),
}

/// A narrow seam for persisting snapshot blobs under string keys.
///
/// The engine treats the bytes as opaque (it serializes a
/// `SimulationSnapshot` itself before calling `write`); implementations
/// only need to round-trip them faithfully.
pub trait SnapshotStore {
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
    fn read(&self, key: &str) -> Result<Vec<u8>, PersistenceError>;
    fn list(&self, prefix: &str) -> Result<Vec<String>, PersistenceError>;
    fn close(&mut self) -> Result<(), PersistenceError>;
}

/// An append-only, file-backed `SnapshotStore`.
///
/// Records are appended to a single log file as `key_len: u32 LE | key
/// bytes | value_len: u64 LE | value bytes`. An in-memory index maps each
/// key to the offset and length of its most recent record, so overwriting
/// a key (e.g. re-running a save slot) never rewrites earlier records —
/// it just appends a new one and the index forgets the old offset.
pub struct FileSnapshotStore {
    path: PathBuf,
    file: File,
    index: BTreeMap<String, (u64, u64)>,
}

impl FileSnapshotStore {
    /// Opens (creating if absent) the log file at `path`, replaying it to
    /// rebuild the in-memory index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let mut store = FileSnapshotStore {
            path,
            file,
            index: BTreeMap::new(),
        };
        store.rebuild_index()?;
        Ok(store)
    }

    fn rebuild_index(&mut self) -> Result<(), PersistenceError> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut offset: u64 = 0;
        loop {
            let mut key_len_buf = [0u8; 4];
            match reader.read_exact(&mut key_len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            let key_len = u32::from_le_bytes(key_len_buf) as u64;
            let mut key_bytes = vec![0u8; key_len as usize];
            reader.read_exact(&mut key_bytes)?;
            let key = String::from_utf8(key_bytes)
                .map_err(|_| PersistenceError::Corrupt("non-utf8 key".to_string()))?;

            let mut value_len_buf = [0u8; 8];
            reader.read_exact(&mut value_len_buf)?;
            let value_len = u64::from_le_bytes(value_len_buf);
            let value_offset = offset + 4 + key_len + 8;
            reader.seek(SeekFrom::Current(value_len as i64))?;

            self.index.insert(key, (value_offset, value_len));
            offset = value_offset + value_len;
        }
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let mut writer = BufWriter::new(&mut self.file);
        let end_offset = writer.seek(SeekFrom::End(0))?;
        let key_bytes = key.as_bytes();
        writer.write_all(&(key_bytes.len() as u32).to_le_bytes())?;
        writer.write_all(key_bytes)?;
        writer.write_all(&(bytes.len() as u64).to_le_bytes())?;
        writer.write_all(bytes)?;
        writer.flush()?;
        let value_offset = end_offset + 4 + key_bytes.len() as u64 + 8;
        self.index
            .insert(key.to_string(), (value_offset, bytes.len() as u64));
        debug!(key, bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, PersistenceError> {
        let (offset, len) = self
            .index
            .get(key)
            .ok_or_else(|| PersistenceError::NotFound(key.to_string()))?;
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(*offset))?;
        let mut buf = vec![0u8; *len as usize];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        Ok(self
            .index
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn close(&mut self) -> Result<(), PersistenceError> {
        self.file.flush()?;
        Ok(())
    }
}

/// An in-memory `SnapshotStore`, used as a test double and by callers who
/// never want snapshots to touch disk.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, PersistenceError> {
        self.blobs
            .get(key)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(key.to_string()))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        Ok(self
            .blobs
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn close(&mut self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Serializes a `SimulationSnapshot` via bincode for storage through a
/// `SnapshotStore`.
pub fn encode_snapshot(
    snapshot: &sim_core::SimulationSnapshot,
) -> Result<Vec<u8>, PersistenceError> {
    bincode::serialize(snapshot).map_err(|e| PersistenceError::Corrupt(e.to_string()))
}

/// Deserializes a `SimulationSnapshot` previously written by `encode_snapshot`.
pub fn decode_snapshot(bytes: &[u8]) -> Result<sim_core::SimulationSnapshot, PersistenceError> {
    bincode::deserialize(bytes).map_err(|e| {
        warn!("failed to decode snapshot blob");
        PersistenceError::Corrupt(e.to_string())
    })
}
