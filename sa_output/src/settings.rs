use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Paths the extractor reads from and writes to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Base directory for generated output; textures land in `textures/`.
    pub output_path: PathBuf,
    /// Directory holding the game's `bin` files.
    pub resources_path: PathBuf,
    pub adrn_file: String,
    pub real_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_path: PathBuf::from("output"),
            resources_path: PathBuf::from("resources"),
            adrn_file: "adrn.bin".to_string(),
            real_file: "real.bin".to_string(),
        }
    }
}

impl Settings {
    pub fn with_output_path<P: Into<PathBuf>>(output_path: P) -> Self {
        Settings {
            output_path: output_path.into(),
            ..Settings::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading settings {}", path.display()))?;
        let settings = serde_json::from_slice(&data)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        Ok(settings)
    }

    pub fn textures_dir(&self) -> PathBuf {
        self.output_path.join("textures")
    }

    pub fn adrn_path(&self) -> PathBuf {
        self.resources_path.join(&self.adrn_file)
    }

    pub fn real_path(&self) -> PathBuf {
        self.resources_path.join(&self.real_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "output_path": "/tmp/sa-out" }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.output_path, PathBuf::from("/tmp/sa-out"));
        assert_eq!(settings.textures_dir(), PathBuf::from("/tmp/sa-out/textures"));
        assert_eq!(settings.adrn_path(), PathBuf::from("resources/adrn.bin"));
        assert_eq!(settings.real_path(), PathBuf::from("resources/real.bin"));
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "output_path = 3").unwrap();
        assert!(Settings::load(&path).is_err());
        assert!(Settings::load(&dir.path().join("absent.json")).is_err());
    }
}
