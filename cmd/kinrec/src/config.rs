//! Config file and store location resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kinrec_recognize::RecognitionConfig;

/// Default base directory under the user's home.
pub const DEFAULT_BASE_DIR: &str = ".kinrec";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_STORE_DIR: &str = "store";

pub const FACE_DB_FILE: &str = "face.redb";
pub const VOICE_DB_FILE: &str = "voice.redb";

fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_BASE_DIR))
        .context("cannot determine home directory")
}

/// Loads the config from `path`, or from `~/.kinrec/config.yaml` when it
/// exists, then applies `KINREC_*` environment overrides.
pub fn load(path: Option<&Path>) -> Result<RecognitionConfig> {
    let cfg = match path {
        Some(path) => RecognitionConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => {
            let default_path = base_dir()?.join(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                RecognitionConfig::load(&default_path)
                    .with_context(|| format!("load config {}", default_path.display()))?
            } else {
                RecognitionConfig::default()
            }
        }
    };
    cfg.with_env().context("apply environment overrides")
}

/// Returns the store directory, creating it if needed.
pub fn store_dir(path: Option<&Path>) -> Result<PathBuf> {
    let dir = match path {
        Some(path) => path.to_path_buf(),
        None => base_dir()?.join(DEFAULT_STORE_DIR),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create store directory {}", dir.display()))?;
    Ok(dir)
}
