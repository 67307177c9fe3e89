use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use gible::GibleError;
use gible::Repository;
use gible::artifacts::diff::file_diff::FileDiff;
use gible::artifacts::diff::tree_diff::DiffFilter;
use gible::artifacts::index::index_entry::StageState;
use gible::artifacts::log::rev_list::HistoryEntry;
use gible::artifacts::merge::outcome::MergeOutcome;
use gible::artifacts::status::status_report::StatusReport;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, `warn` when unset
const LOG_ENV: &str = "GIBLE_LOG";

#[derive(Parser)]
#[command(
    name = "gible",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A local version-control engine",
    long_about = "gible tracks the history of a directory through staged snapshots, \
    supports named branches and merges divergent branches with conflict detection.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage files or directories for the next commit")]
    Add {
        #[arg(required = true, help = "Paths to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "unstage", about = "Drop pending changes from the staging index")]
    Unstage {
        #[arg(required = true, help = "Paths to unstage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "rm", about = "Delete tracked files and stage their removal")]
    Rm {
        #[arg(required = true, help = "Tracked files or directories to remove")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "status", about = "Show staged changes and working tree differences")]
    Status,
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show commit history")]
    Log {
        #[arg(short = 'n', long = "max-count", help = "Limit the number of commits")]
        max_count: Option<usize>,
        #[arg(long, help = "Follow both parents of merge commits")]
        all: bool,
        #[arg(long, help = "One commit per line")]
        oneline: bool,
    },
    #[command(name = "diff", about = "Show changes between two commits")]
    Diff {
        #[arg(index = 1, help = "Old revision")]
        old: String,
        #[arg(index = 2, help = "New revision")]
        new: String,
        #[arg(index = 3, help = "Restrict the diff to this path")]
        path: Option<PathBuf>,
        #[arg(long = "name-status", help = "Only show the kind of change of each path")]
        name_status: bool,
        #[arg(long = "diff-filter", help = "Select changes by kind: A, D and/or M")]
        diff_filter: Option<String>,
    },
    #[command(name = "show", about = "Print a file as recorded by a commit")]
    Show {
        #[arg(index = 1, help = "The revision")]
        revision: String,
        #[arg(index = 2, help = "The file path")]
        path: PathBuf,
    },
    #[command(name = "cat-file", about = "Print the content of a stored blob")]
    CatFile {
        #[arg(index = 1, help = "The blob id, full or abbreviated")]
        object: String,
    },
    #[command(name = "rollback", about = "Commit a snapshot equal to an earlier commit")]
    Rollback {
        #[arg(index = 1, help = "The revision to restore")]
        revision: String,
        #[arg(short, long, help = "The commit message")]
        message: Option<String>,
    },
    #[command(name = "branch", about = "Create, delete or list branches")]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },
    #[command(name = "switch", about = "Switch the active branch")]
    Switch {
        #[arg(index = 1, help = "The branch to switch to")]
        name: String,
    },
    #[command(name = "merge", about = "Merge a branch into the active branch")]
    Merge {
        #[arg(index = 1, required_unless_present = "abort", help = "The branch to merge")]
        branch: Option<String>,
        #[arg(short, long, help = "The merge commit message")]
        message: Option<String>,
        #[arg(long, conflicts_with_all = ["branch", "message"], help = "Abort a conflicted merge")]
        abort: bool,
    },
}

#[derive(Subcommand)]
enum BranchAction {
    #[command(about = "Create a branch at HEAD or at the given revision")]
    Create {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2)]
        start: Option<String>,
    },
    #[command(about = "Delete a branch")]
    Delete {
        #[arg(index = 1)]
        name: String,
    },
    #[command(about = "List branches")]
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    if let Commands::Init { path } = &cli.command {
        let path = path.as_ref().map(|path| pwd.join(path)).unwrap_or(pwd.clone());
        let repository = Repository::init(&path).await?;
        println!(
            "Initialized empty gible repository in {}",
            repository.path().display()
        );
        return Ok(());
    }

    let repository = Repository::discover(&pwd)?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Add { paths } => {
            for (path, state) in repository.stage(&absolute(&pwd, &paths)).await? {
                if state != StageState::Unchanged {
                    writeln!(stdout, "{} {}", state.as_str().green(), path.display())?;
                }
            }
        }
        Commands::Unstage { paths } => {
            for path in repository.unstage(&absolute(&pwd, &paths)).await? {
                writeln!(stdout, "unstaged {}", path.display())?;
            }
        }
        Commands::Rm { paths } => {
            for path in repository.remove(&absolute(&pwd, &paths)).await? {
                writeln!(stdout, "rm '{}'", path.display())?;
            }
        }
        Commands::Status => {
            let report = repository.status_report().await?;
            render_status(&mut stdout, &report)?;
        }
        Commands::Commit { message } => {
            let summary = repository.commit(&message).await?;
            let root = if summary.is_root() { "(root-commit) " } else { "" };
            writeln!(
                stdout,
                "[{} {}{}] {}",
                summary.branch,
                root,
                summary.oid.to_short_oid(),
                summary.short_message
            )?;
        }
        Commands::Log { max_count, all, oneline } => {
            let entries: Vec<HistoryEntry> = if all {
                repository.history_all(max_count).await?.collect::<Result<_>>()?
            } else {
                repository.history(max_count).await?.collect::<Result<_>>()?
            };
            for entry in &entries {
                render_history_entry(&mut stdout, entry, oneline)?;
            }
        }
        Commands::Diff {
            old,
            new,
            path,
            name_status,
            diff_filter,
        } => {
            let filter = match diff_filter {
                Some(filter) => DiffFilter::try_parse(&filter)
                    .ok_or_else(|| anyhow::anyhow!("invalid diff filter '{filter}'"))?,
                None => DiffFilter::default(),
            };
            let path = path.map(|path| pwd.join(path));
            let diffs = repository
                .diff_filtered(&old, &new, path.as_deref(), filter)
                .await?;
            for diff in &diffs {
                render_file_diff(&mut stdout, diff, name_status)?;
            }
        }
        Commands::Show { revision, path } => {
            let content = repository.file_at(&revision, &pwd.join(path)).await?;
            stdout.write_all(&content)?;
        }
        Commands::CatFile { object } => {
            let content = repository.cat_file(&object).await?;
            stdout.write_all(&content)?;
        }
        Commands::Rollback { revision, message } => {
            let summary = repository.rollback(&revision, message.as_deref()).await?;
            writeln!(
                stdout,
                "[{} {}] {}",
                summary.branch,
                summary.oid.to_short_oid(),
                summary.short_message
            )?;
        }
        Commands::Branch { action } => match action {
            BranchAction::Create { name, start } => {
                let oid = repository.create_branch_at(&name, start.as_deref()).await?;
                writeln!(stdout, "Created branch '{}' at {}", name, oid.to_short_oid())?;
            }
            BranchAction::Delete { name } => {
                let oid = repository.delete_branch(&name).await?;
                let at = oid.map(|oid| format!(" (was {})", oid.to_short_oid())).unwrap_or_default();
                writeln!(stdout, "Deleted branch {name}{at}")?;
            }
            BranchAction::List => {
                let current = repository.current_branch().await?;
                for (branch, oid) in repository.list_branches().await? {
                    let tip = oid.map(|oid| oid.to_short_oid()).unwrap_or_default();
                    if branch == current {
                        writeln!(stdout, "* {} {}", branch.to_string().green(), tip)?;
                    } else {
                        writeln!(stdout, "  {branch} {tip}")?;
                    }
                }
            }
        },
        Commands::Switch { name } => {
            if repository.switch_branch(&name).await? {
                writeln!(stdout, "Switched to branch '{name}'")?;
            } else {
                writeln!(stdout, "Already on '{name}'")?;
            }
        }
        Commands::Merge { abort: true, .. } => {
            repository.merge_abort().await?;
            writeln!(stdout, "Merge aborted")?;
        }
        Commands::Merge { branch, message, .. } => {
            let branch = branch.ok_or_else(|| anyhow::anyhow!("no branch to merge"))?;
            let outcome = repository.merge(&branch, message.as_deref()).await?;
            render_merge_outcome(&mut stdout, &outcome)?;

            if let MergeOutcome::Conflicted { .. } = outcome {
                return Err(GibleError::MergeConflict(outcome.conflicted_paths()).into());
            }
        }
    }

    Ok(())
}

fn absolute(pwd: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().map(|path| pwd.join(path)).collect()
}

fn render_status(out: &mut impl Write, report: &StatusReport) -> Result<()> {
    writeln!(out, "On branch {}", report.branch)?;
    if report.head.is_none() {
        writeln!(out, "\nNo commits yet")?;
    }

    if let Some(merge_state) = &report.pending_merge {
        writeln!(out, "\nMerging branch '{}'; fix conflicts and commit:", merge_state.source_branch)?;
        for path in &merge_state.conflicts {
            writeln!(out, "{:>8}{}", "", format!("both changed: {}", path.display()).red())?;
        }
    }

    let staged = report.index_changeset();
    if !staged.is_empty() {
        writeln!(out, "\nChanges to be committed:")?;
        for (path, change) in &staged {
            writeln!(out, "{}{}", change, path.display().to_string().green())?;
        }
    }

    let unstaged = report.workspace_changeset();
    if !unstaged.is_empty() {
        writeln!(out, "\nChanges not staged for commit:")?;
        for (path, change) in &unstaged {
            writeln!(out, "{}{}", change, path.display().to_string().red())?;
        }
    }

    let untracked = report.untracked_files();
    if !untracked.is_empty() {
        writeln!(out, "\nUntracked files:")?;
        for path in untracked {
            writeln!(out, "{:>8}{}", "", path.display().to_string().red())?;
        }
    }

    if report.is_clean() && report.pending_merge.is_none() {
        writeln!(out, "\nnothing to commit, working tree clean")?;
    }

    Ok(())
}

fn render_history_entry(out: &mut impl Write, entry: &HistoryEntry, oneline: bool) -> Result<()> {
    let commit = &entry.commit;

    if oneline {
        writeln!(out, "{} {}", entry.oid.to_short_oid().yellow(), commit.short_message())?;
        return Ok(());
    }

    writeln!(out, "{}", format!("commit {}", entry.oid).yellow())?;
    if commit.is_merge() {
        let parents = commit
            .parents()
            .iter()
            .map(|parent| parent.to_short_oid())
            .collect::<Vec<_>>();
        writeln!(out, "Merge: {}", parents.join(" "))?;
    }
    writeln!(out, "Author: {}", commit.author().display_name())?;
    writeln!(out, "Date:   {}", commit.author().readable_timestamp())?;
    writeln!(out)?;
    for line in commit.message().lines() {
        writeln!(out, "    {line}")?;
    }
    writeln!(out)?;

    Ok(())
}

fn render_file_diff(out: &mut impl Write, diff: &FileDiff, name_status: bool) -> Result<()> {
    if name_status {
        writeln!(out, "{}\t{}", diff.change.status_char(), diff.path.display())?;
        return Ok(());
    }

    let path = diff.path.display();
    writeln!(out, "{}", format!("diff --gible a/{path} b/{path}").bold())?;
    match (diff.old_mode(), diff.new_mode()) {
        (None, Some(mode)) => writeln!(out, "new file mode {mode}")?,
        (Some(mode), None) => writeln!(out, "deleted file mode {mode}")?,
        (Some(old), Some(new)) if old != new => {
            writeln!(out, "old mode {old}")?;
            writeln!(out, "new mode {new}")?;
        }
        _ => {}
    }

    if diff.is_binary() {
        writeln!(out, "Binary files differ")?;
        return Ok(());
    }
    if diff.hunks().is_empty() {
        return Ok(());
    }

    let old_path = diff.old_oid().map(|_| format!("a/{path}")).unwrap_or("/dev/null".to_string());
    let new_path = diff.new_oid().map(|_| format!("b/{path}")).unwrap_or("/dev/null".to_string());
    writeln!(out, "{}", format!("--- {old_path}").bold())?;
    writeln!(out, "{}", format!("+++ {new_path}").bold())?;

    for line in diff.lines() {
        let line = if line.starts_with("@@") {
            line.cyan()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else {
            line.normal()
        };
        writeln!(out, "{line}")?;
    }

    Ok(())
}

fn render_merge_outcome(out: &mut impl Write, outcome: &MergeOutcome) -> Result<()> {
    match outcome {
        MergeOutcome::AlreadyUpToDate => writeln!(out, "Already up to date.")?,
        MergeOutcome::FastForward { from, to } => {
            let from = from.as_ref().map(|oid| oid.to_short_oid()).unwrap_or_default();
            writeln!(out, "Updating {}..{}", from, to.to_short_oid())?;
            writeln!(out, "Fast-forward")?;
        }
        MergeOutcome::Merged { commit } => {
            writeln!(out, "Merge made by the 'three-way' strategy: {}", commit.to_short_oid())?;
        }
        MergeOutcome::Conflicted { conflicts } => {
            for conflict in conflicts {
                writeln!(
                    out,
                    "{} ({}): {}",
                    "CONFLICT".red(),
                    conflict.kind,
                    conflict.path.display()
                )?;
            }
            writeln!(out, "Automatic merge failed; fix conflicts and then commit the result.")?;
        }
    }

    Ok(())
}
