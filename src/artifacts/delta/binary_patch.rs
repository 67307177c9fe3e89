//! Copy/insert block deltas for binary content
//!
//! ## Format
//!
//! ```text
//! <u64 base length> <u64 target length>
//! ( 0x01 <u64 offset> <u32 len>       copy len bytes of the base
//! | 0x02 <u32 len> <len bytes>        insert literal bytes
//! )*
//! ```
//!
//! The base is indexed in `BLOCK_SIZE` blocks at block-aligned offsets; the
//! target is scanned byte by byte and every block hit is extended forward as
//! far as both sides agree.

use crate::artifacts::delta::PatchStrategy;
use anyhow::Context;
use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Write};

pub const BLOCK_SIZE: usize = 16;

const OP_COPY: u8 = 0x01;
const OP_INSERT: u8 = 0x02;

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryPatch;

impl BinaryPatch {
    fn index_blocks(base: &[u8]) -> HashMap<&[u8], usize> {
        let mut blocks = HashMap::new();
        for (i, block) in base.chunks_exact(BLOCK_SIZE).enumerate() {
            blocks.entry(block).or_insert(i * BLOCK_SIZE);
        }
        blocks
    }

    fn flush_insert(patch: &mut Vec<u8>, pending: &mut Vec<u8>) -> anyhow::Result<()> {
        for chunk in pending.chunks(u32::MAX as usize) {
            patch.write_u8(OP_INSERT)?;
            patch.write_u32::<byteorder::NetworkEndian>(chunk.len() as u32)?;
            patch.write_all(chunk)?;
        }
        pending.clear();

        Ok(())
    }
}

impl PatchStrategy for BinaryPatch {
    fn diff(&self, base: &[u8], target: &[u8]) -> anyhow::Result<Bytes> {
        let blocks = Self::index_blocks(base);

        let mut patch = Vec::new();
        patch.write_u64::<byteorder::NetworkEndian>(base.len() as u64)?;
        patch.write_u64::<byteorder::NetworkEndian>(target.len() as u64)?;

        let mut pending = Vec::new();
        let mut i = 0;
        while i < target.len() {
            let hit = target
                .get(i..i + BLOCK_SIZE)
                .and_then(|block| blocks.get(block).copied());

            let Some(offset) = hit else {
                pending.push(target[i]);
                i += 1;
                continue;
            };

            let mut length = BLOCK_SIZE;
            while offset + length < base.len()
                && i + length < target.len()
                && base[offset + length] == target[i + length]
                && length < u32::MAX as usize
            {
                length += 1;
            }

            Self::flush_insert(&mut patch, &mut pending)?;
            patch.write_u8(OP_COPY)?;
            patch.write_u64::<byteorder::NetworkEndian>(offset as u64)?;
            patch.write_u32::<byteorder::NetworkEndian>(length as u32)?;
            i += length;
        }
        Self::flush_insert(&mut patch, &mut pending)?;

        Ok(Bytes::from(patch))
    }

    fn apply(&self, base: &[u8], patch: &[u8]) -> anyhow::Result<Bytes> {
        let mut reader = Cursor::new(patch);

        let base_len = reader
            .read_u64::<byteorder::NetworkEndian>()
            .context("binary patch is missing its header")? as usize;
        let target_len = reader
            .read_u64::<byteorder::NetworkEndian>()
            .context("binary patch is missing its header")? as usize;
        if base_len != base.len() {
            anyhow::bail!(
                "binary patch expects a {} byte base, found {}",
                base_len,
                base.len()
            );
        }

        // the header length is only a hint until the output is checked against it
        let mut output = Vec::with_capacity(target_len.min(base.len() + patch.len()));
        while (reader.position() as usize) < patch.len() {
            match reader.read_u8()? {
                OP_COPY => {
                    let offset = reader
                        .read_u64::<byteorder::NetworkEndian>()
                        .context("truncated binary patch copy")? as usize;
                    let length = reader
                        .read_u32::<byteorder::NetworkEndian>()
                        .context("truncated binary patch copy")? as usize;
                    let copied = offset
                        .checked_add(length)
                        .and_then(|end| base.get(offset..end))
                        .context("binary patch copies outside the base")?;
                    output.extend_from_slice(copied);
                }
                OP_INSERT => {
                    let length = reader
                        .read_u32::<byteorder::NetworkEndian>()
                        .context("truncated binary patch insertion")? as usize;
                    let start = reader.position() as usize;
                    let inserted = start
                        .checked_add(length)
                        .and_then(|end| patch.get(start..end))
                        .context("truncated binary patch insertion")?;
                    reader.set_position((start + length) as u64);
                    output.extend_from_slice(inserted);
                }
                op => anyhow::bail!("unknown binary patch operation {:#04x}", op),
            }

            if output.len() > target_len {
                anyhow::bail!("binary patch overruns its {} byte target", target_len);
            }
        }

        if output.len() != target_len {
            anyhow::bail!(
                "binary patch produced {} bytes, expected {}",
                output.len(),
                target_len
            );
        }

        Ok(Bytes::from(output))
    }
}
