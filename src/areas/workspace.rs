//! Working tree on disk
//!
//! All paths handed to and returned from the workspace are relative to the
//! repository root. The `.gible` directory is never listed nor touched.

use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const METADATA_DIR: &str = ".gible";

const IGNORED_PATHS: [&str; 1] = [METADATA_DIR];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Repository-relative form of `path`, which may be absolute (inside the
    /// root) or already relative to the root. `..` may not escape the root.
    pub fn relativize(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let relative = if path.is_absolute() {
            let root = std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.to_path_buf());
            let absolute = Self::canonicalize_existing_prefix(path);
            absolute
                .strip_prefix(&root)
                .or_else(|_| path.strip_prefix(&self.path))
                .with_context(|| format!("{} is outside the repository", path.display()))?
                .to_path_buf()
        } else {
            path.to_path_buf()
        };

        let mut normalized = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => normalized.push(name),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        anyhow::bail!("{} is outside the repository", path.display());
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    anyhow::bail!("{} is outside the repository", path.display())
                }
            }
        }

        Ok(normalized)
    }

    /// Canonicalize the longest existing ancestor so symlinked roots (e.g. temp
    /// dirs) still match, keeping the non-existing tail as is.
    fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
        let mut tail = Vec::new();
        let mut current = path;
        loop {
            if let Ok(canonical) = std::fs::canonicalize(current) {
                return tail.iter().rev().fold(canonical, |acc, name| acc.join(name));
            }
            match (current.parent(), current.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    current = parent;
                }
                _ => return path.to_path_buf(),
            }
        }
    }

    pub fn is_ignored(path: &Path) -> bool {
        path.components().any(|component| {
            if let Component::Normal(name) = component {
                IGNORED_PATHS.contains(&name.to_string_lossy().as_ref())
            } else {
                false
            }
        })
    }

    /// Every file at or below `root` (the whole tree when `None`), sorted
    pub fn list_files(&self, root: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let root_path = match root {
            Some(root) => self.path.join(root),
            None => self.path.to_path_buf(),
        };

        if root_path.is_file() {
            return Ok(root.map(Path::to_path_buf).into_iter().collect());
        }
        if !root_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = WalkDir::new(&root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path().strip_prefix(&self.path).unwrap_or(entry.path())))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    pub fn is_file(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn is_dir(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_dir()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);
        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file {}", file_path.display()))?;

        Ok(Bytes::from(content))
    }

    pub fn file_mode(&self, file_path: &Path) -> FileMode {
        FileMode::of_path(&self.path.join(file_path))
    }

    /// Write `content` to `file_path`, replacing whatever is there and creating parents
    pub fn write_file(&self, file_path: &Path, content: &[u8], mode: FileMode) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if path.is_dir() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove existing directory: {:?}", file_path))?;
        }
        if let Some(parent) = file_path.parent() {
            self.make_directories(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode.permissions());
            std::fs::set_permissions(&path, permissions)
                .with_context(|| format!("Failed to set permissions for file: {:?}", file_path))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    /// Delete a file and any directories left empty above it
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }
        if let Some(parent) = file_path.parent() {
            self.remove_empty_directories(parent)?;
        }

        Ok(())
    }

    /// Deletions first, then modifications and additions, so a file may
    /// replace a directory emptied by the same migration and vice versa.
    pub fn apply_migration<F>(&self, migration: &Migration, load_blob: F) -> anyhow::Result<()>
    where
        F: Fn(&ObjectId) -> anyhow::Result<Bytes>,
    {
        for (file_path, _) in migration.actions(ActionType::Delete) {
            self.remove_file(file_path)?;
        }

        // children before parents
        for dir_path in migration.rmdirs().iter().rev() {
            self.remove_empty_directories(dir_path)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (file_path, entry) in migration.actions(action) {
                let entry = entry
                    .as_ref()
                    .with_context(|| format!("missing target entry for {}", file_path.display()))?;
                let data = load_blob(&entry.oid)?;
                self.write_file(file_path, &data, entry.mode)?;
            }
        }

        Ok(())
    }

    fn make_directories(&self, dir_path: &Path) -> anyhow::Result<()> {
        let mut current = PathBuf::new();
        for component in dir_path.components() {
            current.push(component);
            let full_path = self.path.join(&current);

            // a file in the way of a directory is replaced
            if full_path.is_file() {
                std::fs::remove_file(&full_path)?;
            }
            if !full_path.is_dir() {
                std::fs::create_dir(&full_path)
                    .with_context(|| format!("Failed to create directory {}", current.display()))?;
            }
        }

        Ok(())
    }

    fn remove_empty_directories(&self, dir_path: &Path) -> anyhow::Result<()> {
        for ancestor in dir_path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }

            let full_path = self.path.join(ancestor);
            if !full_path.is_dir() || full_path.read_dir()?.next().is_some() {
                break;
            }
            std::fs::remove_dir(&full_path)
                .with_context(|| format!("Failed to remove directory {}", ancestor.display()))?;
        }

        Ok(())
    }
}
