pub mod adrn;
pub mod archive;
pub mod real;
pub mod rle;
pub mod texture;

pub use adrn::{AdrnBlock, AdrnIndex};
pub use archive::{SaArchive, TextureSource};
pub use real::{RealBlock, parse_real_block};
pub use rle::{decode_run_length, decode_run_length_into};
pub use texture::{Texture, create_texture, flip_vertical};
