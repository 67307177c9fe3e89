//! Staged change for one path
//!
//! ## Entry Format
//!
//! ```text
//! state   u8       'A' added, 'M' modified, 'D' deleted
//! mode    u32      file mode, 0 for deletions
//! oid     20 bytes blob id, zeros for deletions
//! length  u16      path length in bytes
//! path    bytes
//! padding NUL bytes up to the next 8-byte boundary, at least one
//! ```

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// Maximum path length supported in index entries
const MAX_PATH_SIZE: usize = u16::MAX as usize;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an entry: fixed fields, one path byte and one NUL, aligned
pub const ENTRY_MIN_SIZE: usize = 32;

const STATE_ADDED: u8 = b'A';
const STATE_MODIFIED: u8 = b'M';
const STATE_DELETED: u8 = b'D';

/// Pending operation recorded for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    /// Untracked at HEAD, will be added with this blob
    Added(DatabaseEntry),
    /// Tracked at HEAD with different content or mode
    Modified(DatabaseEntry),
    /// Tracked at HEAD, will be removed
    Deleted,
}

/// What staging a path did, as reported by `status` and `stage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageState {
    Added,
    Modified,
    Deleted,
    /// The path matches HEAD; any pending entry was dropped
    Unchanged,
}

impl StageState {
    pub fn as_str(&self) -> &str {
        match self {
            StageState::Added => "added",
            StageState::Modified => "modified",
            StageState::Deleted => "deleted",
            StageState::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for StageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub path: PathBuf,
    pub change: StagedChange,
}

impl IndexEntry {
    pub fn state(&self) -> StageState {
        match self.change {
            StagedChange::Added(_) => StageState::Added,
            StagedChange::Modified(_) => StageState::Modified,
            StagedChange::Deleted => StageState::Deleted,
        }
    }

    /// Blob and mode the path will have after commit, `None` for a deletion
    pub fn database_entry(&self) -> Option<&DatabaseEntry> {
        match &self.change {
            StagedChange::Added(entry) | StagedChange::Modified(entry) => Some(entry),
            StagedChange::Deleted => None,
        }
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let path = self
            .path
            .to_str()
            .with_context(|| format!("non UTF-8 path {}", self.path.display()))?;
        if path.is_empty() || path.len() > MAX_PATH_SIZE {
            anyhow::bail!("invalid index path length {} for '{}'", path.len(), path);
        }

        let mut entry_bytes = Vec::with_capacity(ENTRY_MIN_SIZE + path.len());
        match &self.change {
            StagedChange::Added(entry) | StagedChange::Modified(entry) => {
                let state = if matches!(self.change, StagedChange::Added(_)) {
                    STATE_ADDED
                } else {
                    STATE_MODIFIED
                };
                entry_bytes.write_u8(state)?;
                entry_bytes.write_u32::<byteorder::NetworkEndian>(entry.mode.as_u32())?;
                entry.oid.write_raw_to(&mut entry_bytes)?;
            }
            StagedChange::Deleted => {
                entry_bytes.write_u8(STATE_DELETED)?;
                entry_bytes.write_u32::<byteorder::NetworkEndian>(0)?;
                entry_bytes.write_all(&[0u8; RAW_OBJECT_ID_LENGTH])?;
            }
        }
        entry_bytes.write_u16::<byteorder::NetworkEndian>(path.len() as u16)?;
        entry_bytes.write_all(path.as_bytes())?;

        // at least one NUL, then pad to the block size
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let state = reader.read_u8()?;
        let mode = reader.read_u32::<byteorder::NetworkEndian>()?;
        let oid = ObjectId::read_raw_from(&mut reader)?;
        let path_len = reader.read_u16::<byteorder::NetworkEndian>()? as usize;

        let mut path = vec![0u8; path_len];
        reader
            .read_exact(&mut path)
            .context("truncated index entry path")?;
        let path = PathBuf::from(String::from_utf8(path)?);

        let change = match state {
            STATE_ADDED => StagedChange::Added(DatabaseEntry::new(oid, FileMode::try_from(mode)?)),
            STATE_MODIFIED => StagedChange::Modified(DatabaseEntry::new(oid, FileMode::try_from(mode)?)),
            STATE_DELETED => StagedChange::Deleted,
            _ => anyhow::bail!("invalid index entry state {:#04x}", state),
        };

        Ok(IndexEntry::new(path, change))
    }
}
