use crate::common::command::{branch_tip, init_repository_dir, run_gible_command};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn delete_branch_successfully(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    run_gible_command(dir.path(), &["branch", "create", "feature"])
        .assert()
        .success();
    let oid = branch_tip(dir.path(), "feature");

    run_gible_command(dir.path(), &["branch", "delete", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Deleted branch feature (was {})", &oid[..7])));

    assert!(!dir.path().join(".gible").join("refs").join("branches").join("feature").exists());

    // commits stay reachable from the other branches
    run_gible_command(dir.path(), &["show", &oid, "1.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("one\n"));

    Ok(())
}

#[rstest]
fn delete_nonexistent_branch_fails(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["branch", "delete", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    Ok(())
}

#[rstest]
fn delete_active_branch_fails(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["branch", "delete", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("while it is checked out"));

    Ok(())
}

#[rstest]
fn delete_hierarchical_branch_prunes_empty_directories(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    run_gible_command(dir.path(), &["branch", "create", "team/feature"])
        .assert()
        .success();

    run_gible_command(dir.path(), &["branch", "delete", "team/feature"])
        .assert()
        .success();

    assert!(!dir.path().join(".gible").join("refs").join("branches").join("team").exists());

    Ok(())
}
