use crate::artifacts::index::CHECKSUM_SIZE;
use anyhow::{Context, bail};
use bytes::Bytes;
use file_guard::FileGuard;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{Read, Write};
use std::ops::DerefMut;

/// Locked index file whose bytes are hashed as they are read or written
#[derive(Debug)]
pub struct Checksum<'f> {
    file: FileGuard<&'f mut File>,
    digest: Sha1,
    offset: u64,
}

impl<'f> Checksum<'f> {
    pub(crate) fn new(file: FileGuard<&'f mut File>) -> Self {
        Checksum {
            file,
            digest: Sha1::new(),
            offset: 0,
        }
    }

    pub(crate) fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.file
            .deref_mut()
            .read_exact(&mut buffer)
            .with_context(|| format!("staging index truncated at byte {}", self.offset))?;

        self.offset += size as u64;
        self.digest.update(&buffer);

        Ok(Bytes::from(buffer))
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.file.deref_mut().write_all(data)?;
        self.offset += data.len() as u64;
        self.digest.update(data);

        Ok(())
    }

    /// Seal the file with the digest of everything written and sync it
    pub(crate) fn write_checksum(&mut self) -> anyhow::Result<()> {
        let digest = self.digest.clone().finalize();
        let file = self.file.deref_mut();
        file.write_all(&digest)?;
        file.sync_all().context("could not sync staging index")?;

        Ok(())
    }

    pub(crate) fn verify(&mut self) -> anyhow::Result<()> {
        let mut stored = [0u8; CHECKSUM_SIZE];
        self.file
            .deref_mut()
            .read_exact(&mut stored)
            .with_context(|| format!("staging index has no checksum after byte {}", self.offset))?;

        if self.digest.clone().finalize().as_slice() != stored {
            bail!("staging index is corrupt: checksum mismatch");
        }

        Ok(())
    }
}
