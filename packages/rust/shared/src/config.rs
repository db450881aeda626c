//! Application configuration for docconf.
//!
//! User config lives at `~/.docconf/docconf.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocConfError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docconf.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docconf";

// ---------------------------------------------------------------------------
// Config structs (matching docconf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Bundle source file used when `--bundle` is not given.
    #[serde(default = "default_bundle_path")]
    pub bundle_path: String,

    /// Whether `check` rejects unresolved placeholder versions.
    #[serde(default = "default_true")]
    pub strict_placeholders: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            bundle_path: default_bundle_path(),
            strict_placeholders: true,
        }
    }
}

fn default_bundle_path() -> String {
    "docs/ghc_config.toml".into()
}
fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Pick the bundle path: explicit flag first, then the config default.
    pub fn bundle_path(&self, flag: Option<&Path>) -> PathBuf {
        match flag {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(&self.defaults.bundle_path),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docconf/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocConfError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docconf/docconf.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocConfError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocConfError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default `docconf.toml` into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DocConfError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| DocConfError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocConfError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
