mod commit_staged_changes;
mod remove_tracked_files;
mod stage_and_unstage;
mod status_report;
