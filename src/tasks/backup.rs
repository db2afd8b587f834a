//! Copy pre-existing configuration aside before it is replaced by links.
use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use super::{BackupRecord, Context, Task, TaskResult, task_deps};
use crate::resources::helpers::fs::{copy_recursive, links_into};

/// Prefix of the per-run backup directory under `$HOME`.
pub const BACKUP_PREFIX: &str = ".dotfiles_backup_";

/// A fresh backup directory for `now`, suffixed `_1`, `_2`, … when a
/// directory with the plain timestamp already exists.
#[must_use]
pub fn backup_dir(home: &Path, now: &DateTime<Local>) -> PathBuf {
    let base = format!("{BACKUP_PREFIX}{}", now.format("%Y%m%d_%H%M%S"));
    let mut candidate = home.join(&base);
    let mut n = 1u32;
    while candidate.symlink_metadata().is_ok() {
        candidate = home.join(format!("{base}_{n}"));
        n += 1;
    }
    candidate
}

/// Targets that hold user data worth saving: present (a dangling link counts
/// as absent) and not already a link into the dotfiles clone.
fn backup_candidates(ctx: &Context) -> Vec<PathBuf> {
    ctx.config
        .backup_targets(&ctx.home)
        .into_iter()
        .filter(|t| t.exists() && !links_into(t, ctx.dotfiles_dir()))
        .collect()
}

/// Back up every configuration path the symlink stage will replace.
#[derive(Debug)]
pub struct BackupConfigs;

impl Task for BackupConfigs {
    fn name(&self) -> &'static str {
        "Back up existing configuration"
    }

    task_deps![super::dotfiles::SyncDotfiles];

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let candidates = backup_candidates(ctx);
        let dir = backup_dir(&ctx.home, &Local::now());

        if ctx.dry_run {
            for path in &candidates {
                ctx.log.dry_run(&format!(
                    "would back up {} to {}",
                    path.display(),
                    dir.display()
                ));
            }
            if candidates.is_empty() {
                ctx.log.info("nothing to back up");
            }
            ctx.record_backup(BackupRecord {
                dir: None,
                saved: candidates,
            });
            return Ok(TaskResult::DryRun);
        }

        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create backup directory {}", dir.display()))?;

        let mut saved = Vec::new();
        for path in candidates {
            let relative = path.strip_prefix(&ctx.home).unwrap_or(path.as_path());
            let dest = dir.join(relative);
            match copy_recursive(&path, &dest) {
                Ok(()) => {
                    ctx.log.debug(&format!("backed up {}", path.display()));
                    saved.push(path);
                }
                Err(e) => {
                    ctx.log
                        .warn(&format!("could not back up {}: {e:#}", path.display()));
                }
            }
        }

        ctx.log.info(&format!(
            "backed up {} path(s) to {}",
            saved.len(),
            dir.display()
        ));
        ctx.record_backup(BackupRecord {
            dir: Some(dir),
            saved,
        });
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{ContextBuilder, WhichExecutor};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn ctx_for(home: &Path) -> Context {
        ContextBuilder::new(Arc::new(WhichExecutor::default()))
            .home(home)
            .build()
    }

    #[test]
    fn backup_dir_uses_timestamp() {
        let home = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(
            backup_dir(home.path(), &now),
            home.path().join(".dotfiles_backup_20240305_070809")
        );
    }

    #[test]
    fn backup_dir_is_unique_within_a_second() {
        let home = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        std::fs::create_dir(backup_dir(home.path(), &now)).unwrap();
        assert_eq!(
            backup_dir(home.path(), &now),
            home.path().join(".dotfiles_backup_20240305_070809_1")
        );
    }

    #[test]
    fn copies_only_existing_targets() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".zshrc"), "export A=1").unwrap();
        let nvim = home.path().join(".config/nvim");
        std::fs::create_dir_all(&nvim).unwrap();
        std::fs::write(nvim.join("init.lua"), "-- mine").unwrap();

        let ctx = ctx_for(home.path());
        BackupConfigs.run(&ctx).unwrap();

        let record = ctx.backup();
        let dir = record.dir.unwrap();
        assert!(dir.starts_with(home.path()));
        assert_eq!(
            std::fs::read_to_string(dir.join(".zshrc")).unwrap(),
            "export A=1"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join(".config/nvim/init.lua")).unwrap(),
            "-- mine"
        );
        assert!(!dir.join(".tmux.conf").exists());
        assert_eq!(record.saved.len(), 2);
        assert!(ctx.was_backed_up(&nvim));
    }

    #[test]
    fn creates_directory_even_when_nothing_to_copy() {
        let home = tempfile::tempdir().unwrap();
        let ctx = ctx_for(home.path());
        BackupConfigs.run(&ctx).unwrap();
        let record = ctx.backup();
        assert!(record.dir.unwrap().is_dir());
        assert!(record.saved.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn skips_links_into_dotfiles_and_dangling_links() {
        let home = tempfile::tempdir().unwrap();
        let dotfiles = home.path().join(".dotfiles");
        std::fs::create_dir(&dotfiles).unwrap();
        std::fs::write(dotfiles.join(".zshrc"), "managed").unwrap();
        std::os::unix::fs::symlink(dotfiles.join(".zshrc"), home.path().join(".zshrc")).unwrap();
        std::os::unix::fs::symlink("/nonexistent/tmux", home.path().join(".tmux.conf")).unwrap();

        let ctx = ctx_for(home.path());
        BackupConfigs.run(&ctx).unwrap();
        assert!(ctx.backup().saved.is_empty());
    }

    #[test]
    fn dry_run_creates_nothing_but_records_candidates() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(".gitconfig"), "[user]").unwrap();
        let ctx = ContextBuilder::new(Arc::new(WhichExecutor::default()))
            .home(home.path())
            .dry_run(true)
            .build();
        assert!(matches!(BackupConfigs.run(&ctx).unwrap(), TaskResult::DryRun));

        let backups = std::fs::read_dir(home.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(BACKUP_PREFIX))
            .count();
        assert_eq!(backups, 0);
        assert!(ctx.was_backed_up(&home.path().join(".gitconfig")));
    }
}
