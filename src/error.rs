//! Domain-specific error types for the bootstrap pipeline.
//!
//! Internal modules return typed errors (e.g. [`InstallError`],
//! [`SourceError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error kinds
//!
//! ```text
//! ConfigError   config file reading and parsing
//! InstallError  package manager and editor fallbacks
//! SourceError   dotfiles clone / fast-forward
//! TaskError     runner ordering and aborts
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while loading the optional configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Errors that arise while installing packages and tools.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No supported package manager was detected.
    #[error("no supported package manager found to install '{package}'")]
    UnsupportedPackageManager {
        /// Package that could not be installed.
        package: String,
    },

    /// No prebuilt archive exists for the CPU architecture.
    #[error("no prebuilt archive for architecture '{0}'")]
    UnsupportedArchitecture(String),

    /// Neither curl nor wget is available for downloads.
    #[error("curl or wget is required to download {0}")]
    NoDownloader(String),

    /// Every strategy in a fallback chain failed.
    #[error("all install strategies failed for '{tool}': {attempts}")]
    NoStrategySucceeded {
        /// Tool being installed.
        tool: String,
        /// Summary of each attempted strategy and its error.
        attempts: String,
    },
}

/// Errors that arise while cloning or updating the dotfiles repository.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The initial clone failed.
    #[error("failed to clone {url} into {dir}: {reason}")]
    Clone {
        /// Remote URL.
        url: String,
        /// Destination directory.
        dir: PathBuf,
        /// Underlying git failure.
        reason: String,
    },

    /// The fast-forward update failed (diverged history, conflict, not a repo).
    #[error("failed to fast-forward {dir}: {reason}")]
    Pull {
        /// Local mirror directory.
        dir: PathBuf,
        /// Underlying git failure.
        reason: String,
    },
}

/// Errors that arise in the task runner.
#[derive(Error, Debug)]
pub enum TaskError {
    /// A required task failed and the run was aborted.
    #[error("required task '{task}' failed: {reason}")]
    Aborted {
        /// Name of the task that failed.
        task: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The task dependency graph contains a cycle.
    #[error("task dependency cycle detected among: {0}")]
    DependencyCycle(String),

    /// A declared dependency is not in the task list.
    #[error("task '{0}' depends on a task that is not scheduled")]
    MissingDependency(String),
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: PathBuf::from("/etc/setup-env.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/etc/setup-env.toml"));
        assert!(e.to_string().contains("IO error reading config file"));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("x.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn install_error_unsupported_manager_display() {
        let e = InstallError::UnsupportedPackageManager {
            package: "tmux".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "no supported package manager found to install 'tmux'"
        );
    }

    #[test]
    fn install_error_unsupported_arch_display() {
        let e = InstallError::UnsupportedArchitecture("riscv64".to_string());
        assert_eq!(e.to_string(), "no prebuilt archive for architecture 'riscv64'");
    }

    #[test]
    fn source_error_clone_display() {
        let e = SourceError::Clone {
            url: "https://example.com/dotfiles.git".to_string(),
            dir: PathBuf::from("/home/u/.dotfiles"),
            reason: "network unreachable".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("failed to clone"));
        assert!(msg.contains("/home/u/.dotfiles"));
        assert!(msg.contains("network unreachable"));
    }

    #[test]
    fn task_error_aborted_display() {
        let e = TaskError::Aborted {
            task: "Sync dotfiles".to_string(),
            reason: "clone failed".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "required task 'Sync dotfiles' failed: clone failed"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<InstallError>();
        assert_send_sync::<SourceError>();
        assert_send_sync::<TaskError>();
    }

    #[test]
    fn install_error_converts_to_anyhow() {
        let e = InstallError::UnsupportedArchitecture("mips".to_string());
        let _anyhow_err: anyhow::Error = e.into();
    }
}
