//! Optional TOML file that overrides any subset of the defaults.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::symlinks::SymlinkEntry;
use super::tools::Tool;
use super::{Config, expand_home};
use crate::error::ConfigError;

/// Deserialized config file. Every field is optional; absent fields keep
/// the default.
///
/// ```toml
/// repo_url = "https://github.com/me/dotfiles.git"
/// dotfiles_dir = "~/src/dotfiles"
///
/// [[tools]]
/// name = "jq"
/// package = "jq"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub dotfiles_dir: Option<PathBuf>,
    pub symlinks: Option<Vec<SymlinkEntry>>,
    pub editor: Option<Tool>,
    pub multiplexer: Option<Tool>,
    pub shell: Option<Tool>,
    pub tools: Option<Vec<Tool>>,
    pub editor_release_url: Option<String>,
    pub editor_source_url: Option<String>,
    pub editor_build_deps: Option<Vec<String>>,
    pub shell_framework_url: Option<String>,
}

/// Read and parse the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if it is not valid or has unknown keys.
pub fn load(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ConfigFile {
    /// Overlay every field that is present onto `config`.
    pub fn apply(self, config: &mut Config, home: &Path) {
        if let Some(v) = self.repo_url {
            config.repo_url = v;
        }
        if let Some(v) = self.branch {
            config.branch = v;
        }
        if let Some(v) = self.dotfiles_dir {
            config.dotfiles_dir = expand_home(&v, home);
        }
        if let Some(v) = self.symlinks {
            config.symlinks = v;
        }
        if let Some(v) = self.editor {
            config.editor = v;
        }
        if let Some(v) = self.multiplexer {
            config.multiplexer = v;
        }
        if let Some(v) = self.shell {
            config.shell = v;
        }
        if let Some(v) = self.tools {
            config.tools = v;
        }
        if let Some(v) = self.editor_release_url {
            config.editor_release_url = v;
        }
        if let Some(v) = self.editor_source_url {
            config.editor_source_url = v;
        }
        if let Some(v) = self.editor_build_deps {
            config.editor_build_deps = Some(v);
        }
        if let Some(v) = self.shell_framework_url {
            config.shell_framework_url = v;
        }
    }
}
