use crate::common::command::{repository_dir, run_gible_command};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn new_repository_has_unborn_master(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_gible_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^Initialized empty gible repository in .+\n$")?)
        .stdout(predicate::str::contains(dir_absolute_path));

    let metadata = repository_dir.path().join(".gible");
    assert!(metadata.join("objects").is_dir());
    assert!(metadata.join("commits").is_dir());
    assert!(metadata.join("config.toml").is_file());
    assert_eq!(
        std::fs::read_to_string(metadata.join("HEAD"))?.trim(),
        "ref: refs/branches/master"
    );
    assert_eq!(
        std::fs::read_to_string(metadata.join("refs").join("branches").join("master"))?,
        ""
    );

    run_gible_command(repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On branch master"))
        .stdout(predicate::str::contains("No commits yet"));

    Ok(())
}

#[rstest]
fn init_at_given_path_creates_the_directory(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success();

    assert!(repository_dir.path().join("nested").join("project").join(".gible").is_dir());

    Ok(())
}

#[rstest]
fn init_twice_fails(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_gible_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    Ok(())
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a gible repository"));

    Ok(())
}
