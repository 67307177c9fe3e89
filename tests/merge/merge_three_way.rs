use crate::common::command::{branch_tip, commit_all, gible_merge, init_repository_dir, run_gible_command};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

/// History:
///       A (base)
///      / \
///     B   C
///     |   |
///   master  feature
///
/// Expected: merge commit with parents B and C, holding both changes
#[rstest]
fn merge_simple_divergence(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["branch", "create", "feature"]).assert().success();

    // Commit B on master: edit 1.txt
    write_file(FileSpec::new(dir.path().join("1.txt"), "master one\n".to_string()));
    commit_all(dir.path(), "Commit B - master changes");
    let b = branch_tip(dir.path(), "master");

    // Commit C on feature: edit a/2.txt and add c.txt
    run_gible_command(dir.path(), &["switch", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("a").join("2.txt"), "feature two\n".to_string()));
    write_file(FileSpec::new(dir.path().join("c.txt"), "see\n".to_string()));
    commit_all(dir.path(), "Commit C - feature changes");
    let c = branch_tip(dir.path(), "feature");

    run_gible_command(dir.path(), &["switch", "master"]).assert().success();
    gible_merge(dir.path(), "feature")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^Merge made by the 'three-way' strategy: [0-9a-f]{7}\n$")?);

    assert_eq!(read_file(&dir.path().join("1.txt")), "master one\n");
    assert_eq!(read_file(&dir.path().join("a").join("2.txt")), "feature two\n");
    assert_eq!(read_file(&dir.path().join("c.txt")), "see\n");

    run_gible_command(dir.path(), &["log", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Merge: {} {}", &b[..7], &c[..7])))
        .stdout(predicate::str::contains("Merge branch 'feature' into master"));

    // the feature branch is untouched
    assert_eq!(branch_tip(dir.path(), "feature"), c);
    run_gible_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to commit, working tree clean"));

    Ok(())
}

#[rstest]
fn merge_with_custom_message(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["branch", "create", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("1.txt"), "master one\n".to_string()));
    commit_all(dir.path(), "Commit B");
    run_gible_command(dir.path(), &["switch", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("c.txt"), "see\n".to_string()));
    commit_all(dir.path(), "Commit C");
    run_gible_command(dir.path(), &["switch", "master"]).assert().success();

    run_gible_command(dir.path(), &["merge", "feature", "-m", "Bring in feature"])
        .assert()
        .success();

    run_gible_command(dir.path(), &["log", "--oneline", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with(" Bring in feature\n"));

    Ok(())
}

#[rstest]
fn merge_refuses_a_dirty_working_tree(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_gible_command(dir.path(), &["branch", "create", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("1.txt"), "master one\n".to_string()));
    commit_all(dir.path(), "Commit B");
    run_gible_command(dir.path(), &["switch", "feature"]).assert().success();
    write_file(FileSpec::new(dir.path().join("c.txt"), "see\n".to_string()));
    commit_all(dir.path(), "Commit C");
    run_gible_command(dir.path(), &["switch", "master"]).assert().success();
    let before = branch_tip(dir.path(), "master");

    write_file(FileSpec::new(dir.path().join("a").join("2.txt"), "wip\n".to_string()));

    gible_merge(dir.path(), "feature")
        .assert()
        .failure()
        .stderr(predicate::str::contains("working tree has uncommitted changes"));

    assert_eq!(branch_tip(dir.path(), "master"), before);
    assert!(!dir.path().join("c.txt").exists());

    Ok(())
}
