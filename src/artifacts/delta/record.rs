//! Delta record: a blob version stored as a patch
//!
//! ## Format
//!
//! ```text
//! delta <size>\0
//! base <base blob id>
//! depth <chain depth>
//! kind <text|binary>
//!
//! <patch bytes>
//! ```
//!
//! The record is filed under the id of the content it reconstructs, not under
//! the hash of its own bytes.

use crate::artifacts::delta::classifier::ContentKind;
use crate::artifacts::objects::object::{Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DeltaRecord {
    pub base: ObjectId,
    /// Number of patches between this version and the nearest full copy
    pub depth: u32,
    pub kind: ContentKind,
    pub patch: Bytes,
}

impl Packable for DeltaRecord {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut body = format!(
            "base {}\ndepth {}\nkind {}\n\n",
            self.base, self.depth, self.kind
        )
        .into_bytes();
        body.extend_from_slice(&self.patch);

        frame(ObjectType::Delta, &body)
    }
}

impl Unpackable for DeltaRecord {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let base = read_header_line(&mut reader, "base")?.parse::<ObjectId>()?;
        let depth = read_header_line(&mut reader, "depth")?
            .parse::<u32>()
            .context("invalid delta depth")?;
        let kind = ContentKind::try_from(read_header_line(&mut reader, "kind")?.as_str())?;

        let mut separator = String::new();
        reader.read_line(&mut separator)?;
        if separator != "\n" {
            anyhow::bail!("invalid delta record: missing patch separator");
        }

        let mut patch = Vec::new();
        reader.read_to_end(&mut patch)?;

        Ok(DeltaRecord::new(base, depth, kind, Bytes::from(patch)))
    }
}

fn read_header_line(reader: &mut impl BufRead, key: &str) -> anyhow::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    line.trim_end_matches('\n')
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::to_string)
        .with_context(|| format!("invalid delta record: missing {key} line"))
}
