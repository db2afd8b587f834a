//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, is_real_dir, occupied, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symlink resource that can be checked and applied.
///
/// Any existing file or symlink at the target is replaced. A real directory
/// is only replaced when `replace_dir` is set, which callers do once the
/// directory has been backed up.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
    /// Whether a real directory at `target` may be removed.
    pub replace_dir: bool,
}

impl SymlinkResource {
    /// Create a new symlink resource that never replaces a real directory.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self {
            source,
            target,
            replace_dir: false,
        }
    }

    /// Allow (or forbid) replacing a real directory at the target.
    #[must_use]
    pub const fn replace_dir(mut self, allowed: bool) -> Self {
        self.replace_dir = allowed;
        self
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;

        if is_real_dir(&self.target) && !self.replace_dir {
            return Ok(ResourceChange::Skipped {
                reason: format!("{} is a directory with no backup", self.target.display()),
            });
        }
        remove_existing(&self.target)?;

        create_symlink(&self.source, &self.target)
            .with_context(|| format!("create link: {}", self.target.display()))?;

        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        if is_real_dir(&self.target) {
            if self.replace_dir {
                return Ok(ResourceState::Incorrect {
                    current: "target is a backed-up directory".to_string(),
                });
            }
            return Ok(ResourceState::Invalid {
                reason: "target is a real directory with no backup".to_string(),
            });
        }

        std::fs::read_link(&self.target).map_or_else(
            |_| {
                if occupied(&self.target) {
                    Ok(ResourceState::Incorrect {
                        current: "target is a regular file".to_string(),
                    })
                } else {
                    Ok(ResourceState::Missing)
                }
            },
            |existing| {
                if existing == self.source {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("points to {}", existing.display()),
                    })
                }
            },
        )
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!(
            "symlinks are not supported on this platform: {} -> {}",
            link.display(),
            target.display()
        )
    }
}
