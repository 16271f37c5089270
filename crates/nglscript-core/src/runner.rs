//! Runs generated scripts with the external `ngless` tool.
//!
//! The script text is written to a temporary `.ngl` file which is removed on
//! every exit path. Only pass/fail of the child process is reported back.
//!
//! # Example
//!
//! ```no_run
//! use nglscript_core::runner::{RunOptions, Runner};
//! use nglscript_core::script::Script;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let script = Script::new("0.8");
//! let runner = Runner::new(RunOptions {
//!     threads: Some(4),
//!     ..Default::default()
//! });
//! runner.run(&script).await?;
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::install::{InstallError, Installer};
use crate::script::Script;

/// Errors that can occur when running a script.
#[derive(Error, Debug)]
pub enum RunError {
    /// `ngless` ran and reported failure.
    #[error("ngless exited with {0}")]
    Failed(ExitStatus),

    /// Auto-install was requested and failed.
    #[error("Auto-install failed: {0}")]
    Install(#[from] InstallError),

    /// An I/O error occurred writing the script or spawning `ngless`.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// The child's exit code, when it ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunError::Failed(status) => status.code(),
            _ => None,
        }
    }
}

/// How to invoke `ngless`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Executable name or path.
    pub binary: PathBuf,
    /// Passed as `-j <threads>`.
    pub threads: Option<usize>,
    /// Extra flags placed before the script path.
    pub extra_args: Vec<String>,
    /// Install `ngless` with this installer when `binary` cannot be found.
    pub auto_install: Option<Installer>,
    /// Log the full script text at `info` before running it.
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ngless"),
            threads: None,
            extra_args: Vec::new(),
            auto_install: None,
            verbose: false,
        }
    }
}

/// Executes scripts with `ngless`.
pub struct Runner {
    options: RunOptions,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Arguments passed to `ngless` for the script at `script_path`.
    pub fn command_args(&self, script_path: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(threads) = self.options.threads {
            args.push(OsString::from("-j"));
            args.push(OsString::from(threads.to_string()));
        }
        args.extend(self.options.extra_args.iter().map(OsString::from));
        args.push(script_path.as_os_str().to_owned());
        args
    }

    /// Writes `script` to a temporary file and runs `ngless` on it.
    pub async fn run(&self, script: &Script) -> Result<(), RunError> {
        let binary = self.resolve_binary().await?;

        let text = script.render();
        let (file, path) = tempfile::Builder::new()
            .prefix("nglscript-")
            .suffix(".ngl")
            .tempfile()?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        drop(file);
        debug!(path = %path.display(), bytes = text.len(), "Wrote script");
        if self.options.verbose {
            info!(script = %text, "Generated script");
        }

        info!(binary = %binary.display(), "Running ngless");
        let status = tokio::process::Command::new(&binary)
            .args(self.command_args(&path))
            .status()
            .await?;
        path.close()?;

        if status.success() {
            Ok(())
        } else {
            warn!(%status, "ngless failed");
            Err(RunError::Failed(status))
        }
    }

    async fn resolve_binary(&self) -> Result<PathBuf, RunError> {
        let binary = &self.options.binary;
        if let Some(found) = find_executable(binary) {
            return Ok(found);
        }
        match &self.options.auto_install {
            Some(installer) => {
                let target = installer.target_path()?;
                installer.install().await?;
                Ok(target)
            }
            // Let the spawn report the missing binary.
            None => Ok(binary.clone()),
        }
    }
}

/// Finds `binary` either as a path or by searching `PATH`.
pub fn find_executable(binary: &Path) -> Option<PathBuf> {
    if binary.components().count() > 1 {
        return binary.is_file().then(|| binary.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
