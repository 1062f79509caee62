//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "WSW_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "wsw.db";

const DEFAULT_PORT: u16 = 5780;
const DEFAULT_CLASSIFIER_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CLASSIFIER_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;

/// Contents of `wsw-intake.toml`
///
/// Every field is optional on disk; missing values fall back to compiled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: u16,
    /// Base URL prefixed to stored photo names, e.g. `http://localhost:5780`
    pub public_base_url: Option<String>,
    pub classifier: ClassifierConfig,
    pub storage: StorageConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: DEFAULT_PORT,
            public_base_url: None,
            classifier: ClassifierConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Public base URL, defaulting to the local listener
    pub fn public_base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", self.port))
            .trim_end_matches('/')
            .to_string()
    }
}

/// Species classification service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_CLASSIFIER_BASE_URL.to_string(),
            model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            timeout_secs: DEFAULT_CLASSIFIER_TIMEOUT_SECS,
        }
    }
}

/// Photo storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for uploaded photos; `<root>/photos` when unset
    pub photo_dir: Option<PathBuf>,
}

/// Default configuration file path for the platform (`<config dir>/wsw/<module>.toml`)
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wsw").join(format!("{}.toml", module_name)))
}

/// Load a TOML config file
///
/// A missing file is not an error: defaults are returned and a warning is logged.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found, using defaults: {}", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded config: {}", path.display());
    Ok(config)
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `WSW_ROOT_FOLDER` environment variable
/// 3. TOML config `root_folder`
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wsw"))
        .unwrap_or_else(|| PathBuf::from("./wsw_data"))
}

/// Create the root folder if missing and return the database path inside it
pub fn ensure_root_folder(root_folder: &Path) -> Result<PathBuf> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(root_folder.join(DATABASE_FILE))
}

/// Photo directory: explicit config, else `<root>/photos`
pub fn photo_dir(root_folder: &Path, toml_config: &TomlConfig) -> PathBuf {
    toml_config
        .storage
        .photo_dir
        .clone()
        .unwrap_or_else(|| root_folder.join("photos"))
}
