mod diff_between_commits;
mod log_history;
