//! On-disk form of a cached texture.
//!
//! Each record is a MessagePack map with the fields `x`, `y`, `width`,
//! `height` and `bitmap`, the bitmap stored as a single binary blob.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use sa_formats::Texture;

use crate::error::TextureCacheError;

pub fn read_texture(path: &Path) -> Result<Texture, TextureCacheError> {
    let file = File::open(path).map_err(|source| TextureCacheError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let texture: Texture =
        rmp_serde::from_read(BufReader::new(file)).map_err(|source| TextureCacheError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    if !texture.is_well_formed() {
        return Err(TextureCacheError::Corrupt {
            path: path.to_path_buf(),
            width: texture.width,
            height: texture.height,
            actual: texture.bitmap.len(),
        });
    }
    Ok(texture)
}

pub fn write_texture(path: &Path, texture: &Texture) -> Result<(), TextureCacheError> {
    let bytes = rmp_serde::to_vec_named(texture).map_err(|source| TextureCacheError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source| TextureCacheError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}
