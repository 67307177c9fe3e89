//! Line-oriented patches for text content
//!
//! ## Format
//!
//! ```text
//! <u32 base line count>
//! ( '=' <u32 n>                 copy the next n base lines
//! | '-' <u32 n>                 skip the next n base lines
//! | '+' <u32 len> <len bytes>   insert bytes
//! )*
//! ```
//!
//! Lines keep their trailing `\n`, so content without a final newline
//! round-trips exactly. Integers are big-endian.

use crate::artifacts::delta::PatchStrategy;
use crate::artifacts::diff::diff_algorithm::{DiffAlgorithm, Edit, MyersDiff, split_lines};
use anyhow::Context;
use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{Cursor, Write};

const OP_EQUAL: u8 = b'=';
const OP_DELETE: u8 = b'-';
const OP_INSERT: u8 = b'+';

#[derive(Debug, Clone, Copy, Default)]
pub struct TextPatch;

#[derive(Debug)]
enum Op<'c> {
    Equal(u32),
    Delete(u32),
    Insert(Vec<&'c [u8]>),
}

impl PatchStrategy for TextPatch {
    fn diff(&self, base: &[u8], target: &[u8]) -> anyhow::Result<Bytes> {
        let (a, b) = (split_lines(base), split_lines(target));
        let script = MyersDiff::new(&a, &b).diff();

        let mut ops: Vec<Op> = Vec::new();
        for edit in script {
            match (edit, ops.last_mut()) {
                (Edit::Equal { .. }, Some(Op::Equal(n))) => *n += 1,
                (Edit::Equal { .. }, _) => ops.push(Op::Equal(1)),
                (Edit::Delete { .. }, Some(Op::Delete(n))) => *n += 1,
                (Edit::Delete { .. }, _) => ops.push(Op::Delete(1)),
                (Edit::Insert { value, .. }, Some(Op::Insert(lines))) => lines.push(value),
                (Edit::Insert { value, .. }, _) => ops.push(Op::Insert(vec![value])),
            }
        }

        let mut patch = Vec::new();
        patch.write_u32::<byteorder::NetworkEndian>(u32::try_from(a.len())?)?;
        for op in ops {
            match op {
                Op::Equal(n) => {
                    patch.write_u8(OP_EQUAL)?;
                    patch.write_u32::<byteorder::NetworkEndian>(n)?;
                }
                Op::Delete(n) => {
                    patch.write_u8(OP_DELETE)?;
                    patch.write_u32::<byteorder::NetworkEndian>(n)?;
                }
                Op::Insert(lines) => {
                    let content = lines.concat();
                    patch.write_u8(OP_INSERT)?;
                    patch.write_u32::<byteorder::NetworkEndian>(u32::try_from(content.len())?)?;
                    patch.write_all(&content)?;
                }
            }
        }

        Ok(Bytes::from(patch))
    }

    fn apply(&self, base: &[u8], patch: &[u8]) -> anyhow::Result<Bytes> {
        let lines = split_lines(base);
        let mut reader = Cursor::new(patch);

        let expected_lines = reader
            .read_u32::<byteorder::NetworkEndian>()
            .context("text patch is missing its header")? as usize;
        if expected_lines != lines.len() {
            anyhow::bail!(
                "text patch expects {} base lines, found {}",
                expected_lines,
                lines.len()
            );
        }

        let mut output = Vec::with_capacity(base.len());
        let mut cursor = 0usize;

        while (reader.position() as usize) < patch.len() {
            let op = reader.read_u8()?;
            let value = reader
                .read_u32::<byteorder::NetworkEndian>()
                .context("truncated text patch operation")? as usize;

            match op {
                OP_EQUAL => {
                    let end = cursor + value;
                    let copied = lines
                        .get(cursor..end)
                        .context("text patch copies past the end of the base")?;
                    copied.iter().for_each(|line| output.extend_from_slice(line));
                    cursor = end;
                }
                OP_DELETE => {
                    if cursor + value > lines.len() {
                        anyhow::bail!("text patch deletes past the end of the base");
                    }
                    cursor += value;
                }
                OP_INSERT => {
                    let start = reader.position() as usize;
                    let inserted = start
                        .checked_add(value)
                        .and_then(|end| patch.get(start..end))
                        .context("truncated text patch insertion")?;
                    reader.set_position((start + value) as u64);
                    output.extend_from_slice(inserted);
                }
                _ => anyhow::bail!("unknown text patch operation {:#04x}", op),
            }
        }

        if cursor != lines.len() {
            anyhow::bail!(
                "text patch consumed {} of {} base lines",
                cursor,
                lines.len()
            );
        }

        Ok(Bytes::from(output))
    }
}
