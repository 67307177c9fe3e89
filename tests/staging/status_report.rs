use crate::common::command::{init_repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn clean_tree_after_commit(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On branch master"))
        .stdout(predicate::str::contains("nothing to commit, working tree clean"));

    Ok(())
}

#[rstest]
fn status_separates_staged_unstaged_and_untracked(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    run_gible_command(dir.path(), &["add", "1.txt"]).assert().success();

    write_file(FileSpec::new(dir.path().join("a").join("2.txt"), "dos\n".to_string()));
    std::fs::remove_file(dir.path().join("a").join("b").join("3.txt"))?;
    write_file(FileSpec::new(dir.path().join("notes.md"), "todo\n".to_string()));

    let output = run_gible_command(dir.path(), &["status"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone())?;

    let staged = stdout.find("Changes to be committed:").expect("no staged section");
    let unstaged = stdout.find("Changes not staged for commit:").expect("no unstaged section");
    let untracked = stdout.find("Untracked files:").expect("no untracked section");
    assert!(staged < unstaged && unstaged < untracked, "unexpected order:\n{stdout}");

    assert!(stdout[staged..unstaged].contains("modified:   1.txt"));
    assert!(stdout[unstaged..untracked].contains("modified:   a/2.txt"));
    assert!(stdout[unstaged..untracked].contains("deleted:    a/b/3.txt"));
    assert!(stdout[untracked..].contains("notes.md"));
    assert!(!stdout.contains("working tree clean"));

    Ok(())
}

#[rstest]
fn status_works_from_a_subdirectory(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(&init_repository_dir.path().join("a").join("b"), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On branch master"));

    Ok(())
}
