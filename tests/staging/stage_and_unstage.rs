use crate::common::command::{gible_commit, init_repository_dir, repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file, write_generated_files};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn stage_nested_directories(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;
    run_gible_command(dir.path(), &["init"]).assert().success();

    write_file(FileSpec::new(dir.path().join("top.txt"), "top\n".to_string()));
    write_file(FileSpec::new(
        dir.path().join("src").join("deep").join("inner.txt"),
        "inner\n".to_string(),
    ));

    run_gible_command(dir.path(), &["add", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("added src/deep/inner.txt"))
        .stdout(predicate::str::contains("top.txt").not());

    run_gible_command(dir.path(), &["add", "top.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("added top.txt\n"));

    Ok(())
}

#[rstest]
fn staging_an_unchanged_file_stages_nothing(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["add", "."])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    gible_commit(dir.path(), "nothing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn reverting_an_edit_drops_the_staged_entry(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    run_gible_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("modified 1.txt\n"));

    write_file(FileSpec::new(dir.path().join("1.txt"), "one\n".to_string()));
    run_gible_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    run_gible_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to commit, working tree clean"));

    Ok(())
}

#[rstest]
fn deleted_files_are_staged_as_deletions(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    std::fs::remove_dir_all(dir.path().join("a"))?;

    run_gible_command(dir.path(), &["add", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted a/2.txt"))
        .stdout(predicate::str::contains("deleted a/b/3.txt"));

    Ok(())
}

#[rstest]
fn staging_a_missing_untracked_path_is_a_no_op(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["add", "ghost.txt"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}

#[rstest]
fn unstage_drops_pending_entries(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    let files = write_generated_files(&dir.path().join("generated"), 3);
    run_gible_command(dir.path(), &["add", "generated"])
        .assert()
        .success();

    let output = run_gible_command(dir.path(), &["unstage", "generated"])
        .assert()
        .success();
    let unstaged = String::from_utf8(output.get_output().stdout.clone())?;
    assert_eq!(unstaged.lines().count(), files.len());

    gible_commit(dir.path(), "nothing staged")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    // the files themselves are untouched
    for file in files {
        assert!(file.path.exists());
    }

    Ok(())
}
