//! Fixed bootstrap configuration with an optional TOML overlay.
pub mod file;
pub mod symlinks;
pub mod tools;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::resources::package::PackageManager;
use symlinks::SymlinkEntry;
use tools::Tool;

/// Remote dotfiles repository cloned by default.
pub const DEFAULT_REPO_URL: &str = "https://github.com/user/dotfiles.git";

/// Branch that the local mirror tracks.
pub const DEFAULT_BRANCH: &str = "main";

/// Directory name of the local mirror under `$HOME`.
pub const DEFAULT_DOTFILES_DIR: &str = ".dotfiles";

/// Base URL for prebuilt Neovim release archives.
pub const EDITOR_RELEASE_URL: &str = "https://github.com/neovim/neovim/releases/latest/download";

/// Upstream Neovim source repository.
pub const EDITOR_SOURCE_URL: &str = "https://github.com/neovim/neovim.git";

/// Unattended installer for the zsh configuration framework.
pub const SHELL_FRAMEWORK_URL: &str =
    "https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh";

/// Everything the pipeline needs to know, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote URL of the dotfiles repository.
    pub repo_url: String,
    /// Branch fast-forwarded on re-runs.
    pub branch: String,
    /// Local mirror of the dotfiles repository.
    pub dotfiles_dir: PathBuf,
    /// Links created from `$HOME` into the mirror.
    pub symlinks: Vec<SymlinkEntry>,
    pub editor: Tool,
    pub multiplexer: Tool,
    pub shell: Tool,
    /// Auxiliary command-line tools.
    pub tools: Vec<Tool>,
    /// Base URL for editor release archives.
    pub editor_release_url: String,
    /// Git URL for building the editor from source.
    pub editor_source_url: String,
    /// Packages required to build the editor from source. `None` selects
    /// the defaults for the detected package manager.
    pub editor_build_deps: Option<Vec<String>>,
    /// URL of the shell framework installer script.
    pub shell_framework_url: String,
}

impl Config {
    /// The fixed defaults for a user whose home directory is `home`.
    #[must_use]
    pub fn defaults(home: &Path) -> Self {
        Self {
            repo_url: DEFAULT_REPO_URL.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            dotfiles_dir: home.join(DEFAULT_DOTFILES_DIR),
            symlinks: symlinks::defaults(),
            editor: Tool::new("nvim", "neovim", &["--version"]),
            multiplexer: Tool::new("tmux", "tmux", &["-V"]),
            shell: Tool::new("zsh", "zsh", &["--version"]),
            tools: tools::default_aux_tools(),
            editor_release_url: EDITOR_RELEASE_URL.to_string(),
            editor_source_url: EDITOR_SOURCE_URL.to_string(),
            editor_build_deps: None,
            shell_framework_url: SHELL_FRAMEWORK_URL.to_string(),
        }
    }

    /// Build the configuration: defaults, then the optional config file,
    /// then command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested config file cannot be
    /// read or parsed.
    pub fn load(home: &Path, global: &GlobalOpts) -> Result<Self> {
        let mut config = Self::defaults(home);

        if let Some(path) = &global.config {
            let overlay = file::load(path)
                .with_context(|| format!("loading config file {}", path.display()))?;
            overlay.apply(&mut config, home);
        }

        if let Some(repo) = &global.repo {
            config.repo_url.clone_from(repo);
        }
        if let Some(branch) = &global.branch {
            config.branch.clone_from(branch);
        }
        if let Some(dir) = &global.dotfiles_dir {
            config.dotfiles_dir = expand_home(dir, home);
        }

        Ok(config)
    }

    /// Paths under `$HOME` that are backed up before linking.
    #[must_use]
    pub fn backup_targets(&self, home: &Path) -> Vec<PathBuf> {
        self.symlinks.iter().map(|s| home.join(&s.target)).collect()
    }

    /// Packages to install before building the editor from source.
    #[must_use]
    pub fn build_deps_for(&self, manager: PackageManager) -> Vec<String> {
        self.editor_build_deps.clone().unwrap_or_else(|| {
            tools::editor_build_deps(manager)
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    /// The editor, multiplexer and shell, in provisioning order.
    #[must_use]
    pub fn core_tools(&self) -> [&Tool; 3] {
        [&self.editor, &self.multiplexer, &self.shell]
    }
}

/// Expand a leading `~/` and resolve relative paths against `home`.
#[must_use]
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        home.join(rest)
    } else if path.is_relative() {
        home.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn no_overrides() -> GlobalOpts {
        GlobalOpts {
            dry_run: false,
            config: None,
            repo: None,
            branch: None,
            dotfiles_dir: None,
        }
    }

    #[test]
    fn defaults_place_mirror_under_home() {
        let config = Config::defaults(Path::new("/home/u"));
        assert_eq!(config.dotfiles_dir, PathBuf::from("/home/u/.dotfiles"));
        assert_eq!(config.branch, "main");
        assert_eq!(config.repo_url, DEFAULT_REPO_URL);
    }

    #[test]
    fn backup_targets_follow_symlink_targets() {
        let config = Config::defaults(Path::new("/home/u"));
        let targets = config.backup_targets(Path::new("/home/u"));
        assert_eq!(targets.len(), 4);
        assert!(targets.contains(&PathBuf::from("/home/u/.config/nvim")));
        assert!(targets.contains(&PathBuf::from("/home/u/.zshrc")));
        assert!(targets.contains(&PathBuf::from("/home/u/.tmux.conf")));
        assert!(targets.contains(&PathBuf::from("/home/u/.gitconfig")));
    }

    #[test]
    fn build_deps_follow_manager_unless_overridden() {
        let mut config = Config::defaults(Path::new("/home/u"));
        assert!(
            config
                .build_deps_for(PackageManager::Pacman)
                .contains(&"base-devel".to_string())
        );
        config.editor_build_deps = Some(vec!["clang".to_string()]);
        assert_eq!(config.build_deps_for(PackageManager::Pacman), vec!["clang"]);
    }

    #[test]
    fn core_tools_in_order() {
        let config = Config::defaults(Path::new("/home/u"));
        let names: Vec<&str> = config.core_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["nvim", "tmux", "zsh"]);
    }

    #[test]
    fn load_without_overrides_is_defaults() {
        let config = Config::load(Path::new("/home/u"), &no_overrides()).unwrap();
        assert_eq!(config.repo_url, DEFAULT_REPO_URL);
    }

    #[test]
    fn cli_overrides_win() {
        let mut global = no_overrides();
        global.repo = Some("https://example.com/d.git".to_string());
        global.branch = Some("dev".to_string());
        global.dotfiles_dir = Some(PathBuf::from("~/src/dots"));
        let config = Config::load(Path::new("/home/u"), &global).unwrap();
        assert_eq!(config.repo_url, "https://example.com/d.git");
        assert_eq!(config.branch, "dev");
        assert_eq!(config.dotfiles_dir, PathBuf::from("/home/u/src/dots"));
    }

    #[test]
    fn config_file_then_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup-env.toml");
        std::fs::write(&path, "repo_url = \"https://file.example/d.git\"\nbranch = \"stable\"\n")
            .unwrap();
        let mut global = no_overrides();
        global.config = Some(path);
        global.branch = Some("cli".to_string());
        let config = Config::load(Path::new("/home/u"), &global).unwrap();
        assert_eq!(config.repo_url, "https://file.example/d.git");
        assert_eq!(config.branch, "cli");
    }

    #[test]
    fn missing_explicit_config_file_is_error() {
        let mut global = no_overrides();
        global.config = Some(PathBuf::from("/nonexistent/setup-env.toml"));
        let err = Config::load(Path::new("/home/u"), &global).unwrap_err();
        assert!(format!("{err:#}").contains("loading config file"));
    }

    #[test]
    fn expand_home_variants() {
        let home = Path::new("/home/u");
        assert_eq!(expand_home(Path::new("~/x"), home), PathBuf::from("/home/u/x"));
        assert_eq!(expand_home(Path::new("x"), home), PathBuf::from("/home/u/x"));
        assert_eq!(expand_home(Path::new("/opt/x"), home), PathBuf::from("/opt/x"));
    }
}
