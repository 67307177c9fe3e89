//! Stored record types
//!
//! Every record is identified by the SHA-1 of its serialized form:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: flat snapshot of tracked paths (mode, path, blob id)
//! - **Commit**: tree, parents, author with millisecond timestamp, message
//!
//! Delta records (see `artifacts::delta`) share the `<type> <size>\0<body>`
//! framing but are addressed by the id of the content they reconstruct.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in binary format
pub const RAW_OBJECT_ID_LENGTH: usize = 20;
