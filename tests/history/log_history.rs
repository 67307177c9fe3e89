use crate::common::command::{commit_all, init_repository_dir, log_oneline, repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn log_lists_commits_newest_first(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    for (i, content) in ["uno\n", "eins\n"].iter().enumerate() {
        write_file(FileSpec::new(dir.path().join("1.txt"), content.to_string()));
        commit_all(dir.path(), &format!("Edit {}", i + 1));
    }

    let lines = log_oneline(dir.path(), &[]);
    let messages = lines
        .iter()
        .map(|line| line.split_once(' ').map(|(_, message)| message).unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(messages, vec!["Edit 2", "Edit 1", "Initial commit"]);

    assert_eq!(log_oneline(dir.path(), &["-n", "2"]).len(), 2);

    Ok(())
}

#[rstest]
fn log_medium_format_shows_author_and_date(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^commit [0-9a-f]{40}\n")?)
        .stdout(predicate::str::contains("Author: fake_user <fake_email@email.com>"))
        .stdout(predicate::str::contains("Date:   Sun Jan 1 12:00:00 2023 +0000"))
        .stdout(predicate::str::contains("\n    Initial commit\n"));

    Ok(())
}

#[rstest]
fn log_on_unborn_branch_is_empty(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;
    run_gible_command(dir.path(), &["init"]).assert().success();

    run_gible_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}
