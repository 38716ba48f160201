use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::{Mmap, MmapOptions};

/// Size of one record in `adrn.bin`.
pub const ADRN_RECORD_SIZE: usize = 80;
const NAME_SIZE: usize = 45;

/// Placement and location of one graphic inside `real.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdrnBlock {
    pub index: u32,
    pub address: u32,
    pub size: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
    /// Tile footprint, only meaningful for map objects.
    pub east: u8,
    pub south: u8,
    pub path: u8,
    pub name: String,
    pub map: u32,
}

impl AdrnBlock {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Serialises the block back into its on-disk record layout.
    pub fn encode(&self) -> [u8; ADRN_RECORD_SIZE] {
        let mut out = [0u8; ADRN_RECORD_SIZE];
        out[0..4].copy_from_slice(&self.index.to_le_bytes());
        out[4..8].copy_from_slice(&self.address.to_le_bytes());
        out[8..12].copy_from_slice(&self.size.to_le_bytes());
        out[12..16].copy_from_slice(&self.x_offset.to_le_bytes());
        out[16..20].copy_from_slice(&self.y_offset.to_le_bytes());
        out[20..24].copy_from_slice(&self.width.to_le_bytes());
        out[24..28].copy_from_slice(&self.height.to_le_bytes());
        out[28] = self.east;
        out[29] = self.south;
        out[30] = self.path;
        let name = self.name.as_bytes();
        let len = name.len().min(NAME_SIZE - 1);
        out[31..31 + len].copy_from_slice(&name[..len]);
        out[76..80].copy_from_slice(&self.map.to_le_bytes());
        out
    }

    fn read_from(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let index = cursor.read_u32::<LittleEndian>()?;
        let address = cursor.read_u32::<LittleEndian>()?;
        let size = cursor.read_u32::<LittleEndian>()?;
        let x_offset = cursor.read_i32::<LittleEndian>()?;
        let y_offset = cursor.read_i32::<LittleEndian>()?;
        let width = cursor.read_u32::<LittleEndian>()?;
        let height = cursor.read_u32::<LittleEndian>()?;
        let east = cursor.read_u8()?;
        let south = cursor.read_u8()?;
        let path = cursor.read_u8()?;
        let mut name_bytes = [0u8; NAME_SIZE];
        cursor.read_exact(&mut name_bytes)?;
        let map = cursor.read_u32::<LittleEndian>()?;

        let name_len = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_SIZE);
        let name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

        Ok(AdrnBlock {
            index,
            address,
            size,
            x_offset,
            y_offset,
            width,
            height,
            east,
            south,
            path,
            name,
            map,
        })
    }
}

#[derive(Debug)]
pub struct AdrnIndex {
    path: PathBuf,
    blocks: Vec<AdrnBlock>,
}

impl AdrnIndex {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf)
            .with_context(|| format!("opening adrn index at {}", path_buf.display()))?;
        let mmap = unsafe { MmapOptions::new().map(&file) }
            .with_context(|| format!("memory-mapping adrn index {}", path_buf.display()))?;

        let blocks = parse_blocks(&mmap)
            .with_context(|| format!("parsing adrn index {}", path_buf.display()))?;

        Ok(AdrnIndex {
            path: path_buf,
            blocks,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(AdrnIndex {
            path: PathBuf::new(),
            blocks: parse_records(bytes)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn blocks(&self) -> &[AdrnBlock] {
        &self.blocks
    }

    pub fn find(&self, id: u32) -> Option<&AdrnBlock> {
        // Records are normally stored in id order; fall back to a scan otherwise.
        if let Some(block) = self.blocks.get(id as usize) {
            if block.index == id {
                return Some(block);
            }
        }
        self.blocks.iter().find(|block| block.index == id)
    }

    pub fn get(&self, id: u32) -> Result<&AdrnBlock> {
        self.find(id)
            .ok_or_else(|| anyhow!("graphic {id} not present in adrn index"))
    }
}

fn parse_blocks(mmap: &Mmap) -> Result<Vec<AdrnBlock>> {
    parse_records(&mmap[..])
}

fn parse_records(bytes: &[u8]) -> Result<Vec<AdrnBlock>> {
    let count = bytes.len() / ADRN_RECORD_SIZE;
    let trailing = bytes.len() % ADRN_RECORD_SIZE;
    if trailing != 0 {
        eprintln!(
            "[sa_formats] warning: ignoring {trailing} trailing bytes after {count} adrn records"
        );
    }

    let mut blocks = Vec::with_capacity(count);
    let mut cursor = Cursor::new(&bytes[..count * ADRN_RECORD_SIZE]);
    for record in 0..count {
        let block = AdrnBlock::read_from(&mut cursor)
            .with_context(|| format!("reading adrn record {record}"))?;
        blocks.push(block);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample(index: u32) -> AdrnBlock {
        AdrnBlock {
            index,
            address: index * 100,
            size: 24,
            x_offset: -16,
            y_offset: -32,
            width: 4,
            height: 2,
            east: 1,
            south: 1,
            path: 0,
            name: format!("tile{index}"),
            map: 7,
        }
    }

    #[test]
    fn parses_records_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(&sample(0).encode());
        data.extend_from_slice(&sample(1).encode());
        assert_eq!(data.len(), 2 * ADRN_RECORD_SIZE);
        file.write_all(&data).unwrap();

        let index = AdrnIndex::open(file.path()).unwrap();
        assert_eq!(index.blocks().len(), 2);
        let block = index.get(1).unwrap();
        assert_eq!(block, &sample(1));
        assert_eq!(block.name, "tile1");
        assert_eq!(block.pixel_count(), 8);
    }

    #[test]
    fn finds_out_of_order_ids() {
        let mut data = sample(9).encode().to_vec();
        data.extend_from_slice(&sample(3).encode());
        let index = AdrnIndex::from_bytes(&data).unwrap();
        assert_eq!(index.find(3).map(|b| b.address), Some(300));
        assert_eq!(index.find(9).map(|b| b.address), Some(900));
        assert!(index.get(4).is_err());
    }

    #[test]
    fn ignores_trailing_partial_record() {
        let mut data = sample(0).encode().to_vec();
        data.extend_from_slice(&[0xAA; 12]);
        let index = AdrnIndex::from_bytes(&data).unwrap();
        assert_eq!(index.blocks().len(), 1);
    }
}
