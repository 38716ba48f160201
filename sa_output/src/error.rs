use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the texture cache. None of them are retried.
#[derive(Debug, Error)]
pub enum TextureCacheError {
    #[error("creating texture cache directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("looking up texture {id} in the archive: {source:#}")]
    Source { id: u32, source: anyhow::Error },
    #[error("texture {id} declares {width}x{height} but decodes to {actual} pixels")]
    Malformed {
        id: u32,
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rmp_serde::decode::Error,
    },
    #[error("could not encode texture for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: rmp_serde::encode::Error,
    },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} holds {actual} pixels but declares {width}x{height}")]
    Corrupt {
        path: PathBuf,
        width: u32,
        height: u32,
        actual: usize,
    },
}
