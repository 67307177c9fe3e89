use crate::common::command::{commit_all, init_repository_dir, run_gible_command};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::{fixture, rstest};

/// `feature` edits `1.txt`, removes `a/b/3.txt` and adds `feature.txt`;
/// `master` is left at the initial commit and active
#[fixture]
fn diverged_repository_dir(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["branch", "create", "feature"])
        .assert()
        .success();
    run_gible_command(dir.path(), &["switch", "feature"])
        .assert()
        .success();

    write_file(FileSpec::new(dir.path().join("1.txt"), "feature one\n".to_string()));
    std::fs::remove_file(dir.path().join("a").join("b").join("3.txt")).expect("Failed to remove a/b/3.txt");
    write_file(FileSpec::new(dir.path().join("feature.txt"), "new\n".to_string()));
    commit_all(dir.path(), "Feature work");

    run_gible_command(dir.path(), &["switch", "master"])
        .assert()
        .success();

    dir
}

#[rstest]
fn switch_rewrites_the_working_tree(diverged_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir;

    assert_eq!(read_file(&dir.path().join("1.txt")), "one\n");
    assert!(dir.path().join("a").join("b").join("3.txt").exists());
    assert!(!dir.path().join("feature.txt").exists());

    run_gible_command(dir.path(), &["switch", "feature"])
        .assert()
        .success()
        .stdout(predicate::eq("Switched to branch 'feature'\n"));

    assert_eq!(read_file(&dir.path().join("1.txt")), "feature one\n");
    assert_eq!(read_file(&dir.path().join("feature.txt")), "new\n");
    // emptied directories are removed
    assert!(!dir.path().join("a").join("b").exists());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".gible").join("HEAD"))?.trim(),
        "ref: refs/branches/feature"
    );

    Ok(())
}

#[rstest]
fn switch_to_the_active_branch_is_a_no_op(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["switch", "master"])
        .assert()
        .success()
        .stdout(predicate::eq("Already on 'master'\n"));

    Ok(())
}

#[rstest]
fn switch_to_unknown_branch_fails(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["switch", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch 'nowhere' does not exist"));

    Ok(())
}

#[rstest]
#[case::unstaged_edit(false)]
#[case::staged_edit(true)]
fn switch_refuses_a_dirty_working_tree(
    diverged_repository_dir: TempDir,
    #[case] staged: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir;

    write_file(FileSpec::new(dir.path().join("a").join("2.txt"), "local edit\n".to_string()));
    if staged {
        run_gible_command(dir.path(), &["add", "a"]).assert().success();
    }

    run_gible_command(dir.path(), &["switch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("working tree has uncommitted changes"))
        .stderr(predicate::str::contains("a/2.txt"));

    // nothing moved
    assert_eq!(read_file(&dir.path().join("a").join("2.txt")), "local edit\n");
    assert_eq!(read_file(&dir.path().join("1.txt")), "one\n");
    assert_eq!(
        std::fs::read_to_string(dir.path().join(".gible").join("HEAD"))?.trim(),
        "ref: refs/branches/master"
    );

    Ok(())
}

#[rstest]
fn switch_refuses_to_overwrite_untracked_files(diverged_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir;
    write_file(FileSpec::new(dir.path().join("feature.txt"), "mine\n".to_string()));

    run_gible_command(dir.path(), &["switch", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("feature.txt"));

    assert_eq!(read_file(&dir.path().join("feature.txt")), "mine\n");

    Ok(())
}

#[rstest]
fn untracked_files_survive_a_switch(diverged_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = diverged_repository_dir;
    write_file(FileSpec::new(dir.path().join("notes.md"), "keep me\n".to_string()));

    run_gible_command(dir.path(), &["switch", "feature"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.path().join("notes.md")), "keep me\n");

    Ok(())
}
