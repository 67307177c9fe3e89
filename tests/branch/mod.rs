mod create_branch;
mod delete_branch;
mod list_branches;
