use anyhow::Result;

use super::{Context, Task, TaskResult, task_deps};
use crate::error::SourceError;

/// Clone the dotfiles repository, or fast-forward an existing clone.
///
/// The remote is authoritative: a clone that cannot be fast-forwarded fails
/// the run rather than being merged or reset.
#[derive(Debug)]
pub struct SyncDotfiles;

impl SyncDotfiles {
    fn pull_repo(ctx: &Context) -> Result<(), SourceError> {
        let dir = ctx.dotfiles_dir();
        let dir_str = dir.to_string_lossy().into_owned();
        ctx.executor
            .run(
                "git",
                &[
                    "-C",
                    &dir_str,
                    "pull",
                    "--ff-only",
                    "origin",
                    &ctx.config.branch,
                ],
            )
            .map_err(|e| SourceError::Pull {
                dir: dir.to_path_buf(),
                reason: format!("{e:#}"),
            })?;
        Ok(())
    }

    fn clone_repo(ctx: &Context) -> Result<(), SourceError> {
        let dir = ctx.dotfiles_dir();
        let dir_str = dir.to_string_lossy().into_owned();
        let url = &ctx.config.repo_url;
        ctx.executor
            .run(
                "git",
                &["clone", "--branch", &ctx.config.branch, url, &dir_str],
            )
            .map_err(|e| SourceError::Clone {
                url: url.clone(),
                dir: dir.to_path_buf(),
                reason: format!("{e:#}"),
            })?;
        Ok(())
    }
}

impl Task for SyncDotfiles {
    fn name(&self) -> &'static str {
        "Sync dotfiles"
    }

    task_deps![super::tools::InstallTools];

    fn required(&self) -> bool {
        true
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let dir = ctx.dotfiles_dir();
        let exists = dir.exists();

        if ctx.dry_run {
            if exists {
                ctx.log.dry_run(&format!(
                    "would fast-forward {} from origin/{}",
                    dir.display(),
                    ctx.config.branch
                ));
            } else {
                ctx.log.dry_run(&format!(
                    "would clone {} into {}",
                    ctx.config.repo_url,
                    dir.display()
                ));
            }
            return Ok(TaskResult::DryRun);
        }

        if exists {
            ctx.log
                .debug(&format!("pulling {} in {}", ctx.config.branch, dir.display()));
            Self::pull_repo(ctx)?;
            ctx.log.info("dotfiles up to date");
        } else {
            ctx.log.debug(&format!(
                "cloning {} into {}",
                ctx.config.repo_url,
                dir.display()
            ));
            Self::clone_repo(ctx)?;
            ctx.log.info(&format!("cloned into {}", dir.display()));
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::RecordingExecutor;
    use crate::tasks::test_helpers::ContextBuilder;
    use std::sync::Arc;

    #[test]
    fn is_required() {
        assert!(SyncDotfiles.required());
    }

    #[test]
    fn clones_when_directory_absent() {
        let home = tempfile::tempdir().unwrap();
        let exec = Arc::new(RecordingExecutor::new());
        let ctx = ContextBuilder::new(exec.clone()).home(home.path()).build();
        SyncDotfiles.run(&ctx).unwrap();
        assert_eq!(
            exec.lines(),
            vec![format!(
                "git clone --branch main {} {}",
                ctx.config.repo_url,
                home.path().join(".dotfiles").display()
            )]
        );
    }

    #[test]
    fn pulls_when_directory_present() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join(".dotfiles")).unwrap();
        let exec = Arc::new(RecordingExecutor::new());
        let ctx = ContextBuilder::new(exec.clone()).home(home.path()).build();
        SyncDotfiles.run(&ctx).unwrap();

        let lines = exec.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("pull --ff-only origin main"));
        assert!(!lines.iter().any(|l| l.contains("clone")));
    }

    #[test]
    fn clone_failure_is_source_error() {
        let home = tempfile::tempdir().unwrap();
        let exec = Arc::new(RecordingExecutor::new().failing("git clone"));
        let ctx = ContextBuilder::new(exec).home(home.path()).build();
        let err = SyncDotfiles.run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Clone { .. })
        ));
    }

    #[test]
    fn diverged_pull_is_source_error() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join(".dotfiles")).unwrap();
        let exec = Arc::new(RecordingExecutor::new().failing("git -C"));
        let ctx = ContextBuilder::new(exec).home(home.path()).build();
        let err = SyncDotfiles.run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Pull { .. })
        ));
    }

    #[test]
    fn dry_run_issues_no_commands() {
        let home = tempfile::tempdir().unwrap();
        let exec = Arc::new(RecordingExecutor::new());
        let ctx = ContextBuilder::new(exec.clone())
            .home(home.path())
            .dry_run(true)
            .build();
        assert!(matches!(SyncDotfiles.run(&ctx).unwrap(), TaskResult::DryRun));
        assert!(exec.calls().is_empty());
    }
}
