//! Platform paths for transito files.
//!
//! ```text
//! ~/.config/transito/
//! └── config.toml
//!
//! ~/.local/share/transito/      # default data_dir
//! ├── catalogo_skus.json
//! ├── config_turno.json
//! └── logs/
//!     └── transito.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "transito";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot find the platform {0} directory")]
    DirNotFound(&'static str),
}

pub struct TransitoPaths;

impl TransitoPaths {
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// Default location of `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("data"))
    }

    pub fn logs_dir(data_dir: &Path) -> PathBuf {
        data_dir.join("logs")
    }
}
