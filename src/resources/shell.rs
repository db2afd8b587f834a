//! Login shell and shell framework resources.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::download::download;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A resource for configuring the default login shell.
#[derive(Debug)]
pub struct DefaultShellResource<'a> {
    /// Target shell name (e.g., "zsh").
    target_shell: String,
    /// The user's current login shell, as read from `$SHELL`.
    current_shell: String,
    /// Executor for running system commands.
    executor: &'a dyn Executor,
}

impl<'a> DefaultShellResource<'a> {
    /// Create a new default shell resource.
    #[must_use]
    pub fn new(target_shell: &str, current_shell: &str, executor: &'a dyn Executor) -> Self {
        Self {
            target_shell: target_shell.to_string(),
            current_shell: current_shell.to_string(),
            executor,
        }
    }
}

impl Applicable for DefaultShellResource<'_> {
    fn description(&self) -> String {
        format!("default shell → {}", self.target_shell)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let result = self.executor.run("which", &[&self.target_shell])?;
        let shell_path = result.stdout.trim();
        if shell_path.is_empty() {
            anyhow::bail!("{} not found on PATH", self.target_shell);
        }
        self.executor.run("chsh", &["-s", shell_path])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DefaultShellResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let suffix = format!("/{}", self.target_shell);

        if self.current_shell.ends_with(&suffix) {
            Ok(ResourceState::Correct)
        } else if self.current_shell.is_empty() {
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Incorrect {
                current: self.current_shell.clone(),
            })
        }
    }
}

/// The shell framework (oh-my-zsh), installed by its unattended installer
/// script.
#[derive(Debug)]
pub struct ShellFrameworkResource<'a> {
    /// Directory the framework lives in once installed.
    pub install_dir: PathBuf,
    /// URL of the installer script.
    pub installer_url: String,
    executor: &'a dyn Executor,
}

impl<'a> ShellFrameworkResource<'a> {
    #[must_use]
    pub fn new(install_dir: PathBuf, installer_url: &str, executor: &'a dyn Executor) -> Self {
        Self {
            install_dir,
            installer_url: installer_url.to_string(),
            executor,
        }
    }
}

impl Applicable for ShellFrameworkResource<'_> {
    fn description(&self) -> String {
        format!("shell framework → {}", self.install_dir.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let tmp = tempfile::tempdir().context("create temporary directory")?;
        let script = tmp.path().join("install.sh");
        download(self.executor, &self.installer_url, &script)?;
        let script_str = script.to_str().context("script path is not valid UTF-8")?;
        // The installer must neither launch zsh nor change the login shell
        // itself; the login shell is handled by DefaultShellResource. An
        // existing ~/.zshrc stays in place for the backup stage.
        self.executor.run_with_env(
            "sh",
            &[script_str, "--unattended"],
            &[("RUNZSH", "no"), ("CHSH", "no"), ("KEEP_ZSHRC", "yes")],
        )?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellFrameworkResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.install_dir.exists() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
