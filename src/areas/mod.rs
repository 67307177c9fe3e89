//! Stateful repository components backed by `.gible/`
//!
//! - `commits`: commit graph
//! - `config`: `config.toml` and environment overrides
//! - `database`: content-addressed record store for blobs and trees
//! - `index`: staging index
//! - `lock`: repository and working tree locks
//! - `refs`: branches and HEAD
//! - `repository`: the aggregate every operation runs against
//! - `workspace`: the working tree on disk

pub mod commits;
pub mod config;
pub mod database;
pub mod index;
pub mod lock;
pub mod refs;
pub mod repository;
pub mod workspace;
