use crate::common::command::{commit_all, init_repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::{fixture, rstest};

/// Second commit edits `1.txt`, deletes `a/2.txt` and adds `c.txt`
#[fixture]
fn two_commit_repository_dir(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    std::fs::remove_file(dir.path().join("a").join("2.txt")).expect("Failed to remove a/2.txt");
    write_file(FileSpec::new(dir.path().join("c.txt"), "see\n".to_string()));
    commit_all(dir.path(), "Second commit");

    dir
}

#[rstest]
fn name_status_between_commits(two_commit_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(two_commit_repository_dir.path(), &["diff", "HEAD~1", "HEAD", "--name-status"])
        .assert()
        .success()
        .stdout(predicate::eq("M\t1.txt\nD\ta/2.txt\nA\tc.txt\n"));

    Ok(())
}

#[rstest]
#[case::added("A", "A\tc.txt\n")]
#[case::deleted_or_modified("DM", "M\t1.txt\nD\ta/2.txt\n")]
fn diff_filter_selects_change_kinds(
    two_commit_repository_dir: TempDir,
    #[case] filter: &str,
    #[case] expected: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(
        two_commit_repository_dir.path(),
        &["diff", "HEAD^", "HEAD", "--name-status", "--diff-filter", filter],
    )
    .assert()
    .success()
    .stdout(predicate::eq(expected.to_string()));

    Ok(())
}

#[rstest]
fn full_patch_for_a_single_path(two_commit_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(two_commit_repository_dir.path(), &["diff", "HEAD^", "HEAD", "1.txt"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "diff --gible a/1.txt b/1.txt\n--- a/1.txt\n+++ b/1.txt\n@@ -1,1 +1,1 @@\n-one\n+uno\n",
        ));

    Ok(())
}

#[rstest]
fn diff_of_a_commit_with_itself_is_empty(two_commit_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(two_commit_repository_dir.path(), &["diff", "HEAD", "master"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}

#[rstest]
fn diff_with_unknown_revision_fails(two_commit_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(two_commit_repository_dir.path(), &["diff", "HEAD", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown revision"));

    Ok(())
}
