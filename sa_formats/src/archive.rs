use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, ensure};
use memmap2::{Mmap, MmapOptions};

use crate::adrn::{AdrnBlock, AdrnIndex};
use crate::real::{RealBlock, parse_real_block};

/// Looks up graphics by identifier. Implementations are trusted: whatever
/// they return is decoded as-is.
pub trait TextureSource {
    fn adrn_block(&self, id: u32) -> Result<AdrnBlock>;
    fn real_block(&self, address: u32, size: u32) -> Result<RealBlock>;
}

impl<T: TextureSource + ?Sized> TextureSource for &T {
    fn adrn_block(&self, id: u32) -> Result<AdrnBlock> {
        (**self).adrn_block(id)
    }

    fn real_block(&self, address: u32, size: u32) -> Result<RealBlock> {
        (**self).real_block(address, size)
    }
}

/// `adrn.bin` and `real.bin` opened side by side.
#[derive(Debug)]
pub struct SaArchive {
    index: AdrnIndex,
    real_path: PathBuf,
    real: Mmap,
}

impl SaArchive {
    pub fn open<A: AsRef<Path>, R: AsRef<Path>>(adrn_path: A, real_path: R) -> Result<Self> {
        let index = AdrnIndex::open(adrn_path)?;

        let real_path = real_path.as_ref().to_path_buf();
        let file = File::open(&real_path)
            .with_context(|| format!("opening real data at {}", real_path.display()))?;
        let real = unsafe { MmapOptions::new().map(&file) }
            .with_context(|| format!("memory-mapping real data {}", real_path.display()))?;

        Ok(SaArchive {
            index,
            real_path,
            real,
        })
    }

    pub fn index(&self) -> &AdrnIndex {
        &self.index
    }

    pub fn real_path(&self) -> &Path {
        &self.real_path
    }

    fn block_range(&self, address: u32, size: u32) -> Result<Range<usize>> {
        let start = address as usize;
        let end = start
            .checked_add(size as usize)
            .ok_or_else(|| anyhow!("real block at {address} size overflow"))?;
        ensure!(
            end <= self.real.len(),
            "real block {start}..{end} extends beyond {} ({} bytes)",
            self.real_path.display(),
            self.real.len()
        );
        Ok(start..end)
    }
}

impl TextureSource for SaArchive {
    fn adrn_block(&self, id: u32) -> Result<AdrnBlock> {
        self.index.get(id).cloned()
    }

    fn real_block(&self, address: u32, size: u32) -> Result<RealBlock> {
        let range = self.block_range(address, size)?;
        parse_real_block(&self.real[range])
            .with_context(|| format!("reading real block at address {address}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn resolves_blocks_through_index() {
        let block = RealBlock {
            major: 1,
            minor: 0,
            width: 4,
            height: 2,
            data: vec![130, 0x7F, 130, 0x00],
        };
        let mut real_bytes = vec![0xEE; 8];
        let encoded = block.encode();
        real_bytes.extend_from_slice(&encoded);

        let adrn = AdrnBlock {
            index: 0,
            address: 8,
            size: encoded.len() as u32,
            x_offset: 0,
            y_offset: 0,
            width: 4,
            height: 2,
            east: 0,
            south: 0,
            path: 0,
            name: String::new(),
            map: 0,
        };

        let mut adrn_file = NamedTempFile::new().unwrap();
        adrn_file.write_all(&adrn.encode()).unwrap();
        let mut real_file = NamedTempFile::new().unwrap();
        real_file.write_all(&real_bytes).unwrap();

        let archive = SaArchive::open(adrn_file.path(), real_file.path()).unwrap();
        let found = archive.adrn_block(0).unwrap();
        assert_eq!(found, adrn);
        let real = archive.real_block(found.address, found.size).unwrap();
        assert_eq!(real, block);

        assert!(archive.adrn_block(1).is_err());
        assert!(archive.real_block(8, 1_000).is_err());
    }
}
