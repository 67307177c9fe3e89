use crate::common::command::{
    branch_tip, commit_all, gible_commit, gible_merge, log_oneline, repository_dir, run_gible_command,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::{fixture, rstest};

/// `greeting.txt` goes from `hello` to `hi` on master and to `hey` on topic;
/// `other.txt` only changes on topic
#[fixture]
fn conflicting_repository_dir(repository_dir: TempDir) -> TempDir {
    let dir = repository_dir;
    run_gible_command(dir.path(), &["init"]).assert().success();

    write_file(FileSpec::new(dir.path().join("greeting.txt"), "hello\n".to_string()));
    write_file(FileSpec::new(dir.path().join("other.txt"), "other\n".to_string()));
    commit_all(dir.path(), "Base");

    run_gible_command(dir.path(), &["branch", "create", "topic"]).assert().success();

    write_file(FileSpec::new(dir.path().join("greeting.txt"), "hi\n".to_string()));
    commit_all(dir.path(), "Say hi");

    run_gible_command(dir.path(), &["switch", "topic"]).assert().success();
    write_file(FileSpec::new(dir.path().join("greeting.txt"), "hey\n".to_string()));
    write_file(FileSpec::new(dir.path().join("other.txt"), "other from topic\n".to_string()));
    commit_all(dir.path(), "Say hey");

    run_gible_command(dir.path(), &["switch", "master"]).assert().success();

    dir
}

#[rstest]
fn conflicting_edits_stop_the_merge(conflicting_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = conflicting_repository_dir;
    let before = branch_tip(dir.path(), "master");

    gible_merge(dir.path(), "topic")
        .assert()
        .failure()
        .stdout(predicate::str::contains("CONFLICT (both modified): greeting.txt"))
        .stdout(predicate::str::contains("Automatic merge failed"))
        .stderr(predicate::str::contains("merge stopped with conflicts"));

    assert_eq!(
        read_file(&dir.path().join("greeting.txt")),
        "<<<<<<< master\nhi\n=======\nhey\n>>>>>>> topic\n"
    );
    // the clean part is applied and staged
    assert_eq!(read_file(&dir.path().join("other.txt")), "other from topic\n");
    // nothing committed yet
    assert_eq!(branch_tip(dir.path(), "master"), before);
    assert!(dir.path().join(".gible").join("MERGE_HEAD").exists());

    run_gible_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merging branch 'topic'"))
        .stdout(predicate::str::contains("both changed: greeting.txt"))
        .stdout(predicate::str::contains("modified:   other.txt"));

    Ok(())
}

#[rstest]
fn resolved_conflict_is_committed_with_two_parents(conflicting_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = conflicting_repository_dir;
    let ours = branch_tip(dir.path(), "master");
    let theirs = branch_tip(dir.path(), "topic");
    gible_merge(dir.path(), "topic").assert().failure();

    // markers still on disk
    gible_commit(dir.path(), "Merge topic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greeting.txt"));

    write_file(FileSpec::new(dir.path().join("greeting.txt"), "hi and hey\n".to_string()));
    run_gible_command(dir.path(), &["add", "greeting.txt"]).assert().success();
    gible_commit(dir.path(), "Merge topic").assert().success();

    run_gible_command(dir.path(), &["log", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Merge: {} {}", &ours[..7], &theirs[..7])));
    run_gible_command(dir.path(), &["show", "HEAD", "other.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("other from topic\n"));
    assert!(!dir.path().join(".gible").join("MERGE_HEAD").exists());

    // the merged history reaches every commit
    assert_eq!(log_oneline(dir.path(), &["--all"]).len(), 4);

    Ok(())
}

#[rstest]
fn pending_merge_blocks_other_operations(conflicting_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = conflicting_repository_dir;
    gible_merge(dir.path(), "topic").assert().failure();

    gible_merge(dir.path(), "topic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("a merge is in progress"));
    run_gible_command(dir.path(), &["switch", "topic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a merge is in progress"));
    run_gible_command(dir.path(), &["rollback", "HEAD~1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a merge is in progress"));

    Ok(())
}

#[rstest]
fn merge_abort_restores_head(conflicting_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = conflicting_repository_dir;
    let before = branch_tip(dir.path(), "master");
    gible_merge(dir.path(), "topic").assert().failure();

    run_gible_command(dir.path(), &["merge", "--abort"])
        .assert()
        .success()
        .stdout(predicate::eq("Merge aborted\n"));

    assert_eq!(read_file(&dir.path().join("greeting.txt")), "hi\n");
    assert_eq!(read_file(&dir.path().join("other.txt")), "other\n");
    assert_eq!(branch_tip(dir.path(), "master"), before);
    run_gible_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to commit, working tree clean"));

    run_gible_command(dir.path(), &["merge", "--abort"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("there is no merge to abort"));

    Ok(())
}

#[rstest]
fn modify_delete_conflict_keeps_the_modified_side(conflicting_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = conflicting_repository_dir;

    // master deletes the file topic modified
    std::fs::remove_file(dir.path().join("other.txt"))?;
    commit_all(dir.path(), "Drop other");

    gible_merge(dir.path(), "topic")
        .assert()
        .failure()
        .stdout(predicate::str::contains("CONFLICT (deleted by us): other.txt"));

    assert_eq!(
        read_file(&dir.path().join("other.txt")),
        "<<<<<<< master\n=======\nother from topic\n>>>>>>> topic\n"
    );

    Ok(())
}
