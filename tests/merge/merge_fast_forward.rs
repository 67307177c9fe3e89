use crate::common::command::{branch_tip, commit_all, gible_merge, init_repository_dir, run_gible_command};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

/// History:
///   A (master) -- B (feature)
///
/// Expected: master moves to B without a merge commit
#[rstest]
fn merge_linear_history_fast_forwards(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    let a = branch_tip(dir.path(), "master");

    run_gible_command(dir.path(), &["branch", "create", "feature"]).assert().success();
    run_gible_command(dir.path(), &["switch", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("1.txt"), "feature one\n".to_string()));
    commit_all(dir.path(), "Commit B");
    let b = branch_tip(dir.path(), "feature");
    run_gible_command(dir.path(), &["switch", "master"]).assert().success();

    gible_merge(dir.path(), "feature")
        .assert()
        .success()
        .stdout(predicate::eq(format!("Updating {}..{}\nFast-forward\n", &a[..7], &b[..7])));

    assert_eq!(branch_tip(dir.path(), "master"), b);
    assert_eq!(read_file(&dir.path().join("1.txt")), "feature one\n");

    Ok(())
}

/// History:
///   A -- B (master)
///   ^ feature
///
/// Expected: nothing to do
#[rstest]
fn merge_ancestor_is_already_up_to_date(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["branch", "create", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    commit_all(dir.path(), "Commit B");
    let b = branch_tip(dir.path(), "master");

    gible_merge(dir.path(), "feature")
        .assert()
        .success()
        .stdout(predicate::eq("Already up to date.\n"));
    gible_merge(dir.path(), "master")
        .assert()
        .success()
        .stdout(predicate::eq("Already up to date.\n"));

    assert_eq!(branch_tip(dir.path(), "master"), b);

    Ok(())
}

#[rstest]
fn merge_unknown_branch_fails(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    gible_merge(init_repository_dir.path(), "ghost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch 'ghost' does not exist"));

    Ok(())
}
