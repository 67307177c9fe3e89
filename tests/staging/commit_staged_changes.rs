use crate::common::command::{branch_tip, gible_commit, init_repository_dir, repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn first_commit_is_a_root_commit(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;
    run_gible_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("readme.md"), "hello\n".to_string()));
    run_gible_command(dir.path(), &["add", "."]).assert().success();

    gible_commit(dir.path(), "Initial commit")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master \(root-commit\) [0-9a-f]{7}\] Initial commit\n$")?);

    assert_eq!(branch_tip(dir.path(), "master").len(), 40);

    Ok(())
}

#[rstest]
fn commit_clears_the_staging_index(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    let before = branch_tip(dir.path(), "master");

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    run_gible_command(dir.path(), &["add", "."]).assert().success();
    gible_commit(dir.path(), "Second commit")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master [0-9a-f]{7}\] Second commit\n$")?);

    assert_ne!(branch_tip(dir.path(), "master"), before);
    gible_commit(dir.path(), "Third commit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn show_and_cat_file_print_stored_content(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    run_gible_command(dir.path(), &["add", "."]).assert().success();
    gible_commit(dir.path(), "Second commit").assert().success();

    run_gible_command(dir.path(), &["show", "HEAD", "1.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("uno\n"));
    run_gible_command(dir.path(), &["show", "HEAD^", "1.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("one\n"));
    run_gible_command(dir.path(), &["show", "HEAD", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    // blob id of "two\n"
    run_gible_command(dir.path(), &["cat-file", "f719efd"])
        .assert()
        .success()
        .stdout(predicate::eq("two\n"));

    Ok(())
}

#[rstest]
fn lock_held_by_another_process_times_out(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    std::fs::write(dir.path().join(".gible").join("LOCK"), "4242\n")?;

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    run_gible_command(dir.path(), &["add", "."])
        .env("GIBLE_LOCK_TIMEOUT_MS", "50")
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out"));

    // the stale lock is left for the user to inspect
    assert!(dir.path().join(".gible").join("LOCK").exists());

    Ok(())
}
