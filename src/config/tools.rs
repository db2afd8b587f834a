//! Tool definitions: executable name, package name, version query.
use serde::Deserialize;

use crate::resources::package::PackageManager;

/// A command-line tool provisioned through the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tool {
    /// Executable looked up on `PATH`.
    pub name: String,
    /// Package that provides the executable.
    pub package: String,
    /// Arguments that make the executable print its version.
    #[serde(default = "default_version_args")]
    pub version_args: Vec<String>,
}

fn default_version_args() -> Vec<String> {
    vec!["--version".to_string()]
}

impl Tool {
    #[must_use]
    pub fn new(name: &str, package: &str, version_args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            version_args: version_args.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Auxiliary tools installed alongside the editor, multiplexer and shell.
#[must_use]
pub fn default_aux_tools() -> Vec<Tool> {
    vec![
        Tool::new("git", "git", &["--version"]),
        Tool::new("curl", "curl", &["--version"]),
        Tool::new("wget", "wget", &["--version"]),
        Tool::new("unzip", "unzip", &["-v"]),
        Tool::new("rg", "ripgrep", &["--version"]),
        Tool::new("fzf", "fzf", &["--version"]),
        Tool::new("htop", "htop", &["--version"]),
    ]
}

/// Toolchain and libraries needed to build the editor from source, named the
/// way `manager` packages them.
#[must_use]
pub const fn editor_build_deps(manager: PackageManager) -> &'static [&'static str] {
    match manager {
        PackageManager::Apt => &[
            "ninja-build",
            "gettext",
            "cmake",
            "unzip",
            "curl",
            "build-essential",
        ],
        PackageManager::Dnf | PackageManager::Yum => &[
            "ninja-build",
            "cmake",
            "gcc",
            "make",
            "gettext",
            "unzip",
            "curl",
        ],
        PackageManager::Pacman => &["base-devel", "cmake", "ninja", "unzip", "curl"],
        PackageManager::Apk => &[
            "build-base",
            "cmake",
            "coreutils",
            "curl",
            "unzip",
            "gettext-tiny-dev",
        ],
        PackageManager::Brew => &["ninja", "cmake", "gettext", "curl"],
        PackageManager::Unknown => &[],
    }
}
