//! Tree: a flat snapshot of the tracked files
//!
//! A tree maps repository-relative paths (always `/`-separated) to the blob
//! and mode committed for that path. Deleted paths are simply absent.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`, entries sorted by path,
//! each entry: `<mode> <path>\0<20-byte blob id>`

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub type TreeEntryMap = BTreeMap<PathBuf, DatabaseEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: TreeEntryMap,
}

impl Tree {
    pub fn new(entries: TreeEntryMap) -> Self {
        Tree { entries }
    }

    pub fn entries(&self) -> &TreeEntryMap {
        &self.entries
    }

    pub fn into_entries(self) -> TreeEntryMap {
        self.entries
    }

    pub fn get(&self, path: &Path) -> Option<&DatabaseEntry> {
        self.entries.get(path)
    }

    pub fn insert(&mut self, path: PathBuf, entry: DatabaseEntry) {
        self.entries.insert(path, entry);
    }

    pub fn remove(&mut self, path: &Path) -> Option<DatabaseEntry> {
        self.entries.remove(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked paths equal to `prefix` or below it
    pub fn paths_under<'t>(&'t self, prefix: &'t Path) -> impl Iterator<Item = &'t PathBuf> + 't {
        self.entries
            .keys()
            .filter(move |path| prefix.as_os_str().is_empty() || path.starts_with(prefix))
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut body = Vec::new();

        for (path, entry) in &self.entries {
            let path = path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("non UTF-8 path {}", path.display()))?;
            write!(body, "{} {}\0", entry.mode.as_str(), path)?;
            entry.oid.write_raw_to(&mut body)?;
        }

        frame(self.object_type(), &body)
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        loop {
            let mut mode = Vec::new();
            if reader.read_until(b' ', &mut mode)? == 0 {
                break;
            }
            let mode = String::from_utf8(mode)?;
            let mode = FileMode::try_from(mode.trim_end())?;

            let mut path = Vec::new();
            reader.read_until(b'\0', &mut path)?;
            if path.pop() != Some(b'\0') {
                anyhow::bail!("truncated tree entry");
            }
            let path = PathBuf::from(String::from_utf8(path)?);

            let oid = ObjectId::read_raw_from(&mut reader)?;
            entries.insert(path, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
