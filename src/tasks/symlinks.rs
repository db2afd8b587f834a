use anyhow::{Context as _, Result};

use super::{Context, ProcessOpts, Task, TaskResult, process_resources, task_deps};
use crate::resources::symlink::SymlinkResource;

/// Link configuration from the dotfiles clone into `$HOME`.
#[derive(Debug)]
pub struct InstallSymlinks;

impl Task for InstallSymlinks {
    fn name(&self) -> &'static str {
        "Install symlinks"
    }

    task_deps![super::backup::BackupConfigs];

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.symlinks.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let config_dir = ctx.home.join(".config");
        if !ctx.dry_run {
            std::fs::create_dir_all(&config_dir)
                .with_context(|| format!("create {}", config_dir.display()))?;
        }

        let resources = ctx.config.symlinks.iter().map(|entry| {
            let target = ctx.home.join(&entry.target);
            let replace_dir = ctx.was_backed_up(&target);
            SymlinkResource::new(ctx.dotfiles_dir().join(&entry.source), target)
                .replace_dir(replace_dir)
        });
        process_resources(ctx, resources, &ProcessOpts::apply_all("link").no_bail())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::BackupRecord;
    use crate::tasks::test_helpers::{ContextBuilder, WhichExecutor};
    use std::path::Path;
    use std::sync::Arc;

    fn populate_dotfiles(home: &Path) {
        let dotfiles = home.join(".dotfiles");
        std::fs::create_dir_all(dotfiles.join("nvim")).unwrap();
        for name in [".zshrc", ".tmux.conf", ".gitconfig"] {
            std::fs::write(dotfiles.join(name), name).unwrap();
        }
    }

    fn ctx_for(home: &Path) -> Context {
        ContextBuilder::new(Arc::new(WhichExecutor::default()))
            .home(home)
            .build()
    }

    #[test]
    fn creates_all_links() {
        let home = tempfile::tempdir().unwrap();
        populate_dotfiles(home.path());
        let ctx = ctx_for(home.path());
        InstallSymlinks.run(&ctx).unwrap();

        for entry in &ctx.config.symlinks {
            let link = home.path().join(&entry.target);
            assert_eq!(
                std::fs::read_link(&link).unwrap(),
                home.path().join(".dotfiles").join(&entry.source)
            );
        }
    }

    #[test]
    fn rerun_leaves_links_unchanged() {
        let home = tempfile::tempdir().unwrap();
        populate_dotfiles(home.path());
        let ctx = ctx_for(home.path());
        InstallSymlinks.run(&ctx).unwrap();
        let first = std::fs::read_link(home.path().join(".zshrc")).unwrap();
        InstallSymlinks.run(&ctx).unwrap();
        assert_eq!(std::fs::read_link(home.path().join(".zshrc")).unwrap(), first);
    }

    #[test]
    fn missing_source_is_skipped() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join(".dotfiles")).unwrap();
        std::fs::write(home.path().join(".dotfiles/.zshrc"), "z").unwrap();
        let ctx = ctx_for(home.path());
        InstallSymlinks.run(&ctx).unwrap();

        assert!(home.path().join(".zshrc").symlink_metadata().is_ok());
        assert!(home.path().join(".tmux.conf").symlink_metadata().is_err());
        assert!(home.path().join(".config").is_dir());
    }

    #[test]
    fn existing_file_is_replaced() {
        let home = tempfile::tempdir().unwrap();
        populate_dotfiles(home.path());
        std::fs::write(home.path().join(".tmux.conf"), "old").unwrap();
        let ctx = ctx_for(home.path());
        InstallSymlinks.run(&ctx).unwrap();
        assert_eq!(
            std::fs::read_to_string(home.path().join(".tmux.conf")).unwrap(),
            ".tmux.conf"
        );
    }

    #[test]
    fn real_directory_replaced_only_after_backup() {
        let home = tempfile::tempdir().unwrap();
        populate_dotfiles(home.path());
        let nvim = home.path().join(".config/nvim");
        std::fs::create_dir_all(&nvim).unwrap();

        let ctx = ctx_for(home.path());
        InstallSymlinks.run(&ctx).unwrap();
        assert!(std::fs::read_link(&nvim).is_err(), "unbacked dir must stay");

        ctx.record_backup(BackupRecord {
            dir: Some(home.path().join(".dotfiles_backup_x")),
            saved: vec![nvim.clone()],
        });
        InstallSymlinks.run(&ctx).unwrap();
        assert_eq!(
            std::fs::read_link(&nvim).unwrap(),
            home.path().join(".dotfiles/nvim")
        );
    }

    #[test]
    fn dry_run_creates_nothing() {
        let home = tempfile::tempdir().unwrap();
        populate_dotfiles(home.path());
        let ctx = ContextBuilder::new(Arc::new(WhichExecutor::default()))
            .home(home.path())
            .dry_run(true)
            .build();
        assert!(matches!(InstallSymlinks.run(&ctx).unwrap(), TaskResult::DryRun));
        assert!(home.path().join(".zshrc").symlink_metadata().is_err());
        assert!(!home.path().join(".config").exists());
    }
}
