//! Staging index file format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "GIBL" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, sorted by path):
//!   - Each entry padded with NULs to 8-byte alignment
//!   - Staged state, mode, blob id and path
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Signature, version and entry count, 4 bytes each
pub const HEADER_SIZE: usize = 12;

pub const SIGNATURE: &[u8; 4] = b"GIBL";

pub const VERSION: u32 = 1;
