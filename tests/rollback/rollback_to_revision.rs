use crate::common::command::{branch_tip, commit_all, init_repository_dir, log_oneline, run_gible_command};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn rollback_records_a_forward_commit(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    let first = branch_tip(dir.path(), "master");

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    std::fs::remove_file(dir.path().join("a").join("2.txt"))?;
    write_file(FileSpec::new(dir.path().join("new.txt"), "new\n".to_string()));
    commit_all(dir.path(), "Second commit");
    let second = branch_tip(dir.path(), "master");

    run_gible_command(dir.path(), &["rollback", &first[..7]])
        .assert()
        .success()
        .stdout(predicate::str::is_match(format!(
            r"^\[master [0-9a-f]{{7}}\] Rollback to {}: Initial commit\n$",
            &first[..7]
        ))?);

    assert_eq!(read_file(&dir.path().join("1.txt")), "one\n");
    assert_eq!(read_file(&dir.path().join("a").join("2.txt")), "two\n");
    assert!(!dir.path().join("new.txt").exists());

    // history is kept: the rollback sits on top of the second commit
    assert_eq!(log_oneline(dir.path(), &[]).len(), 3);
    run_gible_command(dir.path(), &["show", "HEAD^", "new.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("new\n"));
    run_gible_command(dir.path(), &["diff", "HEAD~2", "HEAD", "--name-status"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_ne!(branch_tip(dir.path(), "master"), second);

    Ok(())
}

#[rstest]
fn rollback_with_custom_message(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    commit_all(dir.path(), "Second commit");

    run_gible_command(dir.path(), &["rollback", "HEAD^", "-m", "Undo the translation"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("] Undo the translation\n"));

    Ok(())
}

#[rstest]
fn rollback_to_the_current_snapshot_is_empty(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["rollback", "HEAD"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn rollback_refuses_a_dirty_working_tree(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    commit_all(dir.path(), "Second commit");
    let before = branch_tip(dir.path(), "master");

    write_file(FileSpec::new(dir.path().join("1.txt"), "wip\n".to_string()));

    run_gible_command(dir.path(), &["rollback", "HEAD^"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("working tree has uncommitted changes"));

    assert_eq!(branch_tip(dir.path(), "master"), before);
    assert_eq!(read_file(&dir.path().join("1.txt")), "wip\n");

    Ok(())
}
