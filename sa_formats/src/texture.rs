use serde::{Deserialize, Serialize};

use crate::adrn::AdrnBlock;
use crate::real::RealBlock;
use crate::rle::decode_run_length_into;

/// Decoded graphic, one byte per pixel, rows stored bottom-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(with = "serde_bytes")]
    pub bitmap: Vec<u8>,
}

impl Texture {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the bitmap holds exactly `width * height` pixels.
    pub fn is_well_formed(&self) -> bool {
        self.bitmap.len() == self.pixel_count()
    }
}

/// Builds a texture from its index record and data block.
///
/// Run-length blocks are decoded into a `width * height` buffer; any other
/// block is taken as raw pixels. Either way the rows are flipped afterwards.
/// Malformed input yields wrong pixels, never an error.
pub fn create_texture(adrn: &AdrnBlock, real: RealBlock) -> Texture {
    let width = adrn.width;
    let height = adrn.height;

    let mut bitmap = if real.is_run_length() {
        let mut buffer = vec![0u8; adrn.pixel_count()];
        decode_run_length_into(&real.data, &mut buffer);
        buffer
    } else {
        real.data
    };
    flip_vertical(&mut bitmap, width as usize, height as usize);

    Texture {
        x: adrn.x_offset,
        y: adrn.y_offset,
        width,
        height,
        bitmap,
    }
}

/// Reverses the row order of a row-major buffer in place.
///
/// Rows that do not fit entirely inside `data` are left alone.
pub fn flip_vertical(data: &mut [u8], width: usize, height: usize) {
    if width == 0 {
        return;
    }
    let rows = height.min(data.len() / width);
    if rows < height {
        eprintln!(
            "[sa_formats] warning: flipping {rows} of {height} rows; buffer holds {} bytes",
            data.len()
        );
    }

    let mut scratch = vec![0u8; width];
    for top in 0..rows / 2 {
        let bottom = rows - top - 1;
        let top_range = top * width..(top + 1) * width;
        let bottom_range = bottom * width..(bottom + 1) * width;
        scratch.copy_from_slice(&data[top_range.clone()]);
        data.copy_within(bottom_range.clone(), top_range.start);
        data[bottom_range].copy_from_slice(&scratch);
    }
}
