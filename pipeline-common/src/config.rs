//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `PIPELINE_ROOT`
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted when no CLI root folder is given
pub const ROOT_FOLDER_ENV: &str = "PIPELINE_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "pipeline.db";

/// Uploaded image directory name inside the root folder
pub const IMAGES_DIR: &str = "images";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl TomlConfig {
    /// Load the config file from the platform location, if present
    pub fn load() -> Option<TomlConfig> {
        let path = config_file_path()?;
        match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Platform config file location (`~/.config/pipeline/config.toml` on Linux)
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("pipeline").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/pipeline/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolves the root folder following the priority order in the module docs
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml: Option<TomlConfig>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml: Option<TomlConfig>) -> Self {
        Self { cli_arg, toml }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(root) = self.toml.as_ref().and_then(|c| c.root_folder.as_ref()) {
            info!("Root folder from config file: {}", root);
            return PathBuf::from(root);
        }

        let default = default_root_folder();
        info!("Root folder (default): {}", default.display());
        default
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pipeline"))
        .unwrap_or_else(|| PathBuf::from("./pipeline_data"))
}

/// Creates the root folder layout and names the files inside it
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder and the images directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.images_path())?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }
}
