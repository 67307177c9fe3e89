use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use anyhow::Context;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{BufRead, Write};

/// First block of the staging index file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn with_entries(entries_count: usize) -> anyhow::Result<Self> {
        let entries_count = u32::try_from(entries_count)
            .with_context(|| format!("{entries_count} staged entries do not fit the index header"))?;

        Ok(IndexHeader { entries_count })
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(SIGNATURE)?;
        bytes.write_u32::<NetworkEndian>(VERSION)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

/// Rejects files written by anything but this version of the index format
impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut signature = [0u8; 4];
        reader
            .read_exact(&mut signature)
            .context("staging index header is truncated")?;
        if &signature != SIGNATURE {
            anyhow::bail!(
                "not a staging index: signature {:?}",
                String::from_utf8_lossy(&signature)
            );
        }

        let version = reader.read_u32::<NetworkEndian>()?;
        if version != VERSION {
            anyhow::bail!("unsupported staging index version {version}");
        }

        let entries_count = reader.read_u32::<NetworkEndian>()?;

        Ok(IndexHeader { entries_count })
    }
}
