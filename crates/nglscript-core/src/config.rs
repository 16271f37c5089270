//! Persistent configuration for nglscript.
//!
//! Stores user settings in `~/.nglscript/config.json`: where the `ngless`
//! binary lives, where to download it from, and how many threads to give it.
//! Command-line flags take precedence over anything stored here.
//!
//! # Example
//!
//! ```no_run
//! use nglscript_core::config::NglessConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = NglessConfig::load();
//!
//! if let Some(bin) = &config.ngless_binary {
//!     println!("ngless binary: {}", bin.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_DIRNAME: &str = ".nglscript";
const CONFIG_FILENAME: &str = "config.json";

/// Returns `~/.nglscript`, if a home directory can be determined.
pub fn nglscript_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIRNAME))
}

/// Persistent nglscript configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NglessConfig {
    /// Path to the `ngless` executable. Looked up on `PATH` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngless_binary: Option<PathBuf>,

    /// Where auto-install downloads `ngless` from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Thread count passed to `ngless -j` when none is given explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_threads: Option<usize>,
}

impl NglessConfig {
    /// Load config from `~/.nglscript/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        nglscript_dir()
            .map(|dir| Self::load_from(&dir.join(CONFIG_FILENAME)))
            .unwrap_or_default()
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.nglscript/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        let dir = nglscript_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Could not determine home directory")
        })?;
        std::fs::create_dir_all(&dir)?;
        self.save_to(&dir.join(CONFIG_FILENAME))
    }

    /// Save config as pretty JSON to an explicit path.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_empty() {
        let config = NglessConfig::default();
        assert!(config.ngless_binary.is_none());
        assert!(config.download_url.is_none());
        assert!(config.default_threads.is_none());
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = NglessConfig {
            ngless_binary: Some(PathBuf::from("/opt/ngless/bin/ngless")),
            download_url: None,
            default_threads: Some(8),
        };
        config.save_to(&path).unwrap();
        assert_eq!(NglessConfig::load_from(&path), config);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("download_url"));
    }

    #[test]
    fn deserialize_empty_json() {
        let loaded: NglessConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded, NglessConfig::default());
    }

    #[test]
    fn missing_or_garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(NglessConfig::load_from(&missing), NglessConfig::default());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert_eq!(NglessConfig::load_from(&garbage), NglessConfig::default());
    }
}
