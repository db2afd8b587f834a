//! The fixed set of links from `$HOME` into the dotfiles mirror.
use serde::Deserialize;

/// A symlink to create: `$HOME/<target>` → `<dotfiles_dir>/<source>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymlinkEntry {
    /// Path relative to the dotfiles directory.
    pub source: String,
    /// Path relative to `$HOME`.
    pub target: String,
}

impl SymlinkEntry {
    #[must_use]
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Editor configuration directory plus three dotfiles.
#[must_use]
pub fn defaults() -> Vec<SymlinkEntry> {
    vec![
        SymlinkEntry::new("nvim", ".config/nvim"),
        SymlinkEntry::new(".zshrc", ".zshrc"),
        SymlinkEntry::new(".tmux.conf", ".tmux.conf"),
        SymlinkEntry::new(".gitconfig", ".gitconfig"),
    ]
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn editor_config_dir_is_first() {
        let links = defaults();
        assert_eq!(links[0], SymlinkEntry::new("nvim", ".config/nvim"));
    }

    #[test]
    fn targets_are_unique() {
        let links = defaults();
        let mut targets: Vec<&str> = links.iter().map(|l| l.target.as_str()).collect();
        targets.sort_unstable();
        targets.dedup();
        assert_eq!(targets.len(), links.len());
    }
}
