use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{debug, info, warn};
use sa_formats::{Texture, TextureSource, create_texture};

use crate::error::TextureCacheError;
use crate::settings::Settings;
use crate::store::{read_texture, write_texture};

/// Lazily decodes textures and keeps them, both in memory and as one file per
/// identifier under `<output>/textures`.
///
/// Cache misses are serialized through a single lock, so each identifier is
/// decoded and written at most once per cache directory. Entries are never
/// replaced or evicted.
#[derive(Debug)]
pub struct TextureManager<S> {
    source: S,
    texture_dir: PathBuf,
    textures: RwLock<HashMap<u32, Arc<Texture>>>,
    miss_lock: Mutex<()>,
}

impl<S: TextureSource> TextureManager<S> {
    pub fn new(settings: &Settings, source: S) -> Result<Self, TextureCacheError> {
        let texture_dir = settings.textures_dir();
        fs::create_dir_all(&texture_dir).map_err(|source| TextureCacheError::CreateDir {
            path: texture_dir.clone(),
            source,
        })?;

        Ok(TextureManager {
            source,
            texture_dir,
            textures: RwLock::new(HashMap::new()),
            miss_lock: Mutex::new(()),
        })
    }

    pub fn texture_dir(&self) -> &Path {
        &self.texture_dir
    }

    pub fn texture_path(&self, id: u32) -> PathBuf {
        self.texture_dir.join(format!("{id}.bin"))
    }

    pub fn is_cached_on_disk(&self, id: u32) -> bool {
        self.texture_path(id).is_file()
    }

    /// Identifiers currently held in memory, ascending.
    pub fn cached_ids(&self) -> Vec<u32> {
        let textures = self.textures.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<u32> = textures.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn get_texture(&self, id: u32) -> Result<Arc<Texture>, TextureCacheError> {
        if let Some(texture) = self.lookup(id) {
            return Ok(texture);
        }

        let _guard = self.miss_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished this id while we waited.
        if let Some(texture) = self.lookup(id) {
            return Ok(texture);
        }

        let path = self.texture_path(id);
        let texture = if path.is_file() {
            debug!("restoring texture {id} from {}", path.display());
            read_texture(&path)?
        } else {
            let texture = self.decode(id)?;
            write_texture(&path, &texture)?;
            info!(
                "cached texture {id} ({}x{}) at {}",
                texture.width,
                texture.height,
                path.display()
            );
            texture
        };

        let texture = Arc::new(texture);
        self.textures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&texture));
        Ok(texture)
    }

    fn lookup(&self, id: u32) -> Option<Arc<Texture>> {
        self.textures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn decode(&self, id: u32) -> Result<Texture, TextureCacheError> {
        let source_err = |source| TextureCacheError::Source { id, source };
        let adrn = self.source.adrn_block(id).map_err(source_err)?;
        let real = self
            .source
            .real_block(adrn.address, adrn.size)
            .map_err(source_err)?;
        debug!(
            "decoding texture {id}: major {} payload {} bytes",
            real.major,
            real.data.len()
        );

        let texture = create_texture(&adrn, real);
        if !texture.is_well_formed() {
            warn!(
                "texture {id} declares {}x{} but holds {} pixels; not caching it",
                texture.width,
                texture.height,
                texture.bitmap.len()
            );
            return Err(TextureCacheError::Malformed {
                id,
                width: texture.width,
                height: texture.height,
                actual: texture.bitmap.len(),
            });
        }
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use sa_formats::{AdrnBlock, RealBlock};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Default)]
    struct SingleBlock {
        fetches: AtomicUsize,
    }

    impl TextureSource for SingleBlock {
        fn adrn_block(&self, id: u32) -> Result<AdrnBlock> {
            if id != 5 {
                bail!("graphic {id} not present in adrn index");
            }
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(AdrnBlock {
                index: id,
                address: 0,
                size: 20,
                x_offset: 1,
                y_offset: 2,
                width: 4,
                height: 2,
                east: 0,
                south: 0,
                path: 0,
                name: String::new(),
                map: 0,
            })
        }

        fn real_block(&self, _address: u32, _size: u32) -> Result<RealBlock> {
            Ok(RealBlock {
                major: 1,
                minor: 0,
                width: 4,
                height: 2,
                data: vec![130, 0x7F, 130, 0x00],
            })
        }
    }

    #[test]
    fn decodes_once_and_serves_from_memory() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_output_path(dir.path());
        let source = SingleBlock::default();
        let manager = TextureManager::new(&settings, &source).unwrap();

        assert!(manager.texture_dir().is_dir());
        assert!(!manager.is_cached_on_disk(5));

        let first = manager.get_texture(5).unwrap();
        assert_eq!(first.bitmap, vec![0, 0, 0, 0, 0x7F, 0x7F, 0, 0]);
        assert!(manager.is_cached_on_disk(5));
        assert_eq!(manager.texture_path(5), dir.path().join("textures").join("5.bin"));

        let second = manager.get_texture(5).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(manager.cached_ids(), vec![5]);
    }

    #[test]
    fn unknown_id_is_a_source_error() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_output_path(dir.path());
        let manager = TextureManager::new(&settings, SingleBlock::default()).unwrap();

        let err = manager.get_texture(6).unwrap_err();
        assert!(matches!(err, TextureCacheError::Source { id: 6, .. }));
        assert!(!manager.is_cached_on_disk(6));
        assert!(manager.cached_ids().is_empty());
    }
}
