use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use gible::Repository;
use gible::artifacts::objects::object_id::ObjectId;
use gible::commands::porcelain::commit::CommitSummary;
use std::path::{Path, PathBuf};

pub async fn init_repository() -> (TempDir, Repository) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repository = Repository::init(dir.path())
        .await
        .expect("Failed to initialize repository");

    (dir, repository)
}

pub fn write(repository: &Repository, path: &str, content: &str) {
    write_file(FileSpec::new(repository.path().join(path), content.to_string()));
}

pub fn remove(repository: &Repository, path: &str) {
    std::fs::remove_file(repository.path().join(path))
        .unwrap_or_else(|e| panic!("Failed to remove {path}: {e}"));
}

pub fn read(repository: &Repository, path: &str) -> String {
    std::fs::read_to_string(repository.path().join(path))
        .unwrap_or_else(|e| panic!("Failed to read {path}: {e}"))
}

/// Stage the whole working tree and commit it
pub async fn commit_all(repository: &Repository, message: &str) -> CommitSummary {
    repository
        .stage(&[PathBuf::from("")])
        .await
        .expect("Failed to stage working tree");
    repository
        .commit(message)
        .await
        .expect("Failed to commit")
}

/// Id of the blob `path` holds in the commit `revision` names
pub async fn blob_at(repository: &Repository, revision: &str, path: &str) -> ObjectId {
    let commit_oid = repository.resolve(revision).await.expect("Failed to resolve revision");
    let commit = repository.commits().load(&commit_oid).expect("Failed to load commit");
    let tree = repository
        .database()
        .parse_object_as_tree(commit.tree_oid())
        .expect("Failed to load tree");

    tree.get(Path::new(path))
        .unwrap_or_else(|| panic!("{path} is not in {revision}"))
        .oid
        .clone()
}

/// Overwrite `.gible/config.toml` and open the repository again to pick it up
pub fn reopen_with_config(repository: Repository, config: &str) -> Repository {
    std::fs::write(repository.metadata_path().join("config.toml"), config).expect("Failed to write config");
    Repository::open(repository.path()).expect("Failed to reopen repository")
}
