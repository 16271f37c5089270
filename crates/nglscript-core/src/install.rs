//! On-demand installation of the `ngless` binary.
//!
//! [`Installer`] downloads a prebuilt Linux binary to a target path and marks
//! it executable. Existing files are left alone unless forced.
//!
//! # Example
//!
//! ```no_run
//! use nglscript_core::install::{Installer, InstallMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let installed = Installer::new(InstallMode::User).install().await?;
//! if !installed {
//!     println!("ngless already present");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Where the prebuilt binary is fetched from by default.
pub const DEFAULT_DOWNLOAD_URL: &str = "http://ngless.embl.de/releases/ngless-0.8.1-Linux64";

const GLOBAL_TARGET: &str = "/usr/local/bin/ngless";

/// Errors that can occur while installing `ngless`.
#[derive(Error, Debug)]
pub enum InstallError {
    /// Neither a mode nor an explicit target was given.
    #[error("Could not determine installation target")]
    NoTarget,

    /// Prebuilt binaries only exist for Linux.
    #[error("Installing ngless is only supported on Linux (detected platform: {0}); see http://ngless.embl.de")]
    UnsupportedPlatform(String),

    /// The download failed.
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error occurred while writing the binary.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install location presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// `~/.local/bin/ngless`
    User,
    /// `/usr/local/bin/ngless`
    Global,
}

/// Downloads `ngless` to a target path.
#[derive(Debug, Clone)]
pub struct Installer {
    mode: Option<InstallMode>,
    target: Option<PathBuf>,
    force: bool,
    url: String,
}

impl Default for Installer {
    fn default() -> Self {
        Self::new(InstallMode::User)
    }
}

impl Installer {
    pub fn new(mode: InstallMode) -> Self {
        Self {
            mode: Some(mode),
            target: None,
            force: false,
            url: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }

    /// An installer with neither mode nor target; set one before installing.
    pub fn unconfigured() -> Self {
        Self {
            mode: None,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: Option<InstallMode>) -> Self {
        self.mode = mode;
        self
    }

    /// An explicit target path wins over the mode.
    pub fn with_target(mut self, target: Option<PathBuf>) -> Self {
        self.target = target;
        self
    }

    /// Overwrite an existing file.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Where the binary will be downloaded from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Resolves where the binary will be written.
    pub fn target_path(&self) -> Result<PathBuf, InstallError> {
        if let Some(target) = &self.target {
            return Ok(target.clone());
        }
        match self.mode {
            Some(InstallMode::User) => dirs::home_dir()
                .map(|home| home.join(".local").join("bin").join("ngless"))
                .ok_or(InstallError::NoTarget),
            Some(InstallMode::Global) => Ok(PathBuf::from(GLOBAL_TARGET)),
            None => Err(InstallError::NoTarget),
        }
    }

    /// Installs `ngless`, returning whether a file was written.
    ///
    /// Returns `Ok(false)` without touching the network when the target
    /// already exists and `force` is off.
    pub async fn install(&self) -> Result<bool, InstallError> {
        let target = self.target_path()?;
        if target.exists() && !self.force {
            info!(target = %target.display(), "ngless already installed");
            return Ok(false);
        }
        if !cfg!(target_os = "linux") {
            return Err(InstallError::UnsupportedPlatform(std::env::consts::OS.to_string()));
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if target.exists() {
            // Previous installs are read-only.
            tokio::fs::remove_file(&target).await?;
        }

        info!(url = %self.url, target = %target.display(), "Downloading ngless");
        let mut response = reqwest::get(&self.url).await?.error_for_status()?;
        let mut file = tokio::fs::File::create(&target).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        set_executable(&target).await?;
        info!(target = %target.display(), "Download complete");
        Ok(true)
    }
}

#[cfg(unix)]
async fn set_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o555)).await
}

#[cfg(not(unix))]
async fn set_executable(_path: &std::path::Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_target_wins_over_mode() {
        let installer = Installer::new(InstallMode::Global)
            .with_target(Some(PathBuf::from("/tmp/custom/ngless")));
        assert_eq!(installer.target_path().unwrap(), PathBuf::from("/tmp/custom/ngless"));
    }

    #[test]
    fn global_mode_target() {
        let installer = Installer::new(InstallMode::Global);
        assert_eq!(installer.target_path().unwrap(), PathBuf::from("/usr/local/bin/ngless"));
        assert_eq!(installer.url(), DEFAULT_DOWNLOAD_URL);
    }

    #[test]
    fn user_mode_target_is_under_home() {
        if let Some(home) = dirs::home_dir() {
            let target = Installer::new(InstallMode::User).target_path().unwrap();
            assert_eq!(target, home.join(".local/bin/ngless"));
        }
    }

    #[test]
    fn no_mode_no_target_is_an_error() {
        let err = Installer::unconfigured().target_path().unwrap_err();
        assert!(matches!(err, InstallError::NoTarget));
    }

    #[tokio::test]
    async fn existing_target_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("ngless");
        std::fs::write(&target, "already here").unwrap();

        let installer = Installer::unconfigured()
            .with_target(Some(target.clone()))
            .with_url("http://127.0.0.1:9/unreachable");
        assert!(!installer.install().await.unwrap());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "already here");
    }

    #[cfg(not(target_os = "linux"))]
    #[tokio::test]
    async fn non_linux_platforms_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let installer = Installer::unconfigured().with_target(Some(dir.path().join("ngless")));
        let err = installer.install().await.unwrap_err();
        assert!(matches!(err, InstallError::UnsupportedPlatform(_)));
    }
}
