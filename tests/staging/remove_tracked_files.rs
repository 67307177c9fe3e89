use crate::common::command::{gible_commit, init_repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn rm_deletes_and_stages_a_directory(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["rm", "a"])
        .assert()
        .success()
        .stdout(predicate::eq("rm 'a/2.txt'\nrm 'a/b/3.txt'\n"));

    assert!(!dir.path().join("a").exists());
    assert!(dir.path().join("1.txt").exists());

    gible_commit(dir.path(), "Drop a").assert().success();
    run_gible_command(dir.path(), &["diff", "HEAD^", "HEAD", "--name-status"])
        .assert()
        .success()
        .stdout(predicate::eq("D\ta/2.txt\nD\ta/b/3.txt\n"));

    Ok(())
}

#[rstest]
fn rm_forgets_a_staged_addition(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("new.txt"), "new\n".to_string()));
    run_gible_command(dir.path(), &["add", "new.txt"]).assert().success();

    run_gible_command(dir.path(), &["rm", "new.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("rm 'new.txt'\n"));

    assert!(!dir.path().join("new.txt").exists());
    gible_commit(dir.path(), "nothing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn rm_refuses_untracked_paths(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("loose.txt"), "loose\n".to_string()));

    run_gible_command(dir.path(), &["rm", "1.txt", "loose.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "pathspec 'loose.txt' did not match any tracked file",
        ));

    assert!(dir.path().join("1.txt").exists());
    assert!(dir.path().join("loose.txt").exists());
    gible_commit(dir.path(), "nothing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}
