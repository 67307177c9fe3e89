use crate::common::command::{branch_tip, init_repository_dir, run_gible_command};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn list_branches_marks_the_active_one(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;
    for name in ["zeta", "alpha", "team/beta"] {
        run_gible_command(dir.path(), &["branch", "create", name])
            .assert()
            .success();
    }
    let short = branch_tip(dir.path(), "master")[..7].to_string();

    run_gible_command(dir.path(), &["branch", "list"])
        .assert()
        .success()
        .stdout(predicate::eq(format!(
            "  alpha {short}\n* master {short}\n  team/beta {short}\n  zeta {short}\n"
        )));

    Ok(())
}
