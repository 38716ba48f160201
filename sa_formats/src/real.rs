use anyhow::{Result, ensure};
use std::convert::TryInto;

const MAGIC: &[u8; 2] = b"RD";
pub const REAL_HEADER_SIZE: usize = 16;

/// `major` value marking a run-length encoded payload.
pub const MAJOR_RUN_LENGTH: u8 = 1;

/// One graphic block read from `real.bin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealBlock {
    pub major: u8,
    pub minor: u8,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RealBlock {
    pub fn is_run_length(&self) -> bool {
        self.major == MAJOR_RUN_LENGTH
    }

    /// Builds the on-disk form: `RD` header followed by the payload.
    pub fn encode(&self) -> Vec<u8> {
        let total = REAL_HEADER_SIZE + self.data.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(MAGIC);
        out.push(self.major);
        out.push(self.minor);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

/// Parses a block whose bytes were sliced out of `real.bin` using the adrn
/// address and size. The block size in the header wins when it is smaller
/// than the slice; a larger value is clamped to what is available.
pub fn parse_real_block(bytes: &[u8]) -> Result<RealBlock> {
    ensure!(
        bytes.len() >= REAL_HEADER_SIZE,
        "real block shorter than its {REAL_HEADER_SIZE}-byte header"
    );
    ensure!(&bytes[0..2] == MAGIC, "real block missing RD signature");

    let major = bytes[2];
    let minor = bytes[3];
    let width = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    let height = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let declared = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;

    let end = declared.clamp(REAL_HEADER_SIZE, bytes.len());
    let data = bytes[REAL_HEADER_SIZE..end].to_vec();

    Ok(RealBlock {
        major,
        minor,
        width,
        height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_payload() {
        let block = RealBlock {
            major: 1,
            minor: 0,
            width: 4,
            height: 2,
            data: vec![130, 0x7F, 130, 0x00],
        };
        let bytes = block.encode();
        assert_eq!(bytes.len(), REAL_HEADER_SIZE + 4);

        let parsed = parse_real_block(&bytes).expect("parse succeeds");
        assert_eq!(parsed, block);
        assert!(parsed.is_run_length());
    }

    #[test]
    fn declared_size_limits_payload() {
        let block = RealBlock {
            major: 0,
            minor: 0,
            width: 2,
            height: 1,
            data: vec![1, 2],
        };
        let mut bytes = block.encode();
        bytes.extend_from_slice(&[9, 9, 9]);

        let parsed = parse_real_block(&bytes).unwrap();
        assert_eq!(parsed.data, vec![1, 2]);
        assert!(!parsed.is_run_length());
    }

    #[test]
    fn rejects_missing_signature() {
        let mut bytes = vec![0u8; REAL_HEADER_SIZE];
        bytes[0..2].copy_from_slice(b"XX");
        assert!(parse_real_block(&bytes).is_err());
        assert!(parse_real_block(b"RD").is_err());
    }
}
