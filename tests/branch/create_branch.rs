use crate::common::command::{branch_tip, commit_all, init_repository_dir, repository_dir, run_gible_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
#[case::simple("feature")]
#[case::hierarchical("feature/login")]
#[case::dashes_and_digits("release-1.2")]
fn create_branch_at_head(init_repository_dir: TempDir, #[case] name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    let head = branch_tip(dir.path(), "master");

    run_gible_command(dir.path(), &["branch", "create", name])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Created branch '{name}' at {}", &head[..7])));

    assert_eq!(branch_tip(dir.path(), name), head);

    Ok(())
}

#[rstest]
#[case::leading_dot(".hidden")]
#[case::double_dot("a..b")]
#[case::trailing_slash("topic/")]
#[case::lock_suffix("topic.lock")]
#[case::space("two words")]
fn create_branch_with_invalid_name_fails(init_repository_dir: TempDir, #[case] name: &str) -> Result<(), Box<dyn std::error::Error>> {
    run_gible_command(init_repository_dir.path(), &["branch", "create", name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid branch name"));

    Ok(())
}

#[rstest]
fn create_duplicate_branch_fails(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["branch", "create", "feature"])
        .assert()
        .success();
    run_gible_command(dir.path(), &["branch", "create", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    Ok(())
}

#[rstest]
fn create_branch_from_ancestor(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    let first = branch_tip(dir.path(), "master");

    write_file(FileSpec::new(dir.path().join("1.txt"), "uno\n".to_string()));
    commit_all(dir.path(), "Second commit");

    run_gible_command(dir.path(), &["branch", "create", "old", "HEAD~1"])
        .assert()
        .success();
    run_gible_command(dir.path(), &["branch", "create", "by-id", &first[..8]])
        .assert()
        .success();

    assert_eq!(branch_tip(dir.path(), "old"), first);
    assert_eq!(branch_tip(dir.path(), "by-id"), first);

    Ok(())
}

#[rstest]
fn create_branch_without_commits_fails(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;
    run_gible_command(dir.path(), &["init"]).assert().success();

    run_gible_command(dir.path(), &["branch", "create", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no commits yet"));

    Ok(())
}
