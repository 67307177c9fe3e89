use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with one commit holding `1.txt`, `a/2.txt` and `a/b/3.txt`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_gible_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three\n".to_string(),
    ));

    run_gible_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    gible_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_gible_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gible").expect("Failed to find gible binary");
    cmd.envs(vec![("NO_COLOR", "1"), ("GIBLE_LOG", "off")]);
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn gible_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_gible_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIBLE_AUTHOR_NAME", "fake_user"),
        ("GIBLE_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GIBLE_AUTHOR_DATE", AUTHOR_DATE), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd
}

pub fn gible_merge(dir: &Path, branch: &str) -> Command {
    let mut cmd = run_gible_command(dir, &["merge", branch]);
    cmd.envs(vec![
        ("GIBLE_AUTHOR_NAME", "fake_user"),
        ("GIBLE_AUTHOR_EMAIL", "fake_email@email.com"),
    ]);
    cmd
}

/// Stage everything and commit it
pub fn commit_all(dir: &Path, message: &str) {
    run_gible_command(dir, &["add", "."]).assert().success();
    gible_commit(dir, message).assert().success();
}

/// Commit id stored in `refs/branches/<branch>`, empty for an unborn branch
pub fn branch_tip(dir: &Path, branch: &str) -> String {
    let path = dir.join(".gible").join("refs").join("branches").join(branch);
    std::fs::read_to_string(path)
        .expect("Failed to read branch")
        .trim()
        .to_string()
}

/// Lines printed by `log --oneline`, newest first
pub fn log_oneline(dir: &Path, extra: &[&str]) -> Vec<String> {
    let mut args = vec!["log", "--oneline"];
    args.extend_from_slice(extra);

    let output = run_gible_command(dir, &args).assert().success();
    String::from_utf8(output.get_output().stdout.clone())
        .expect("log output is not utf-8")
        .lines()
        .map(str::to_string)
        .collect()
}
