//! Named, dependency-ordered tasks that orchestrate resource changes.
pub mod backup;
pub mod context;
pub mod dotfiles;
pub mod editor;
pub mod graph;
mod processing;
pub mod report;
pub mod shell;
pub mod symlinks;
pub mod tools;

/// Implement [`Task::dependencies`] by expanding to the required
/// `fn dependencies(&self) -> &[TypeId]` method body.
///
/// The `const DEPS` intermediate gives the slice the `'static` lifetime the
/// return type needs; [`std::any::TypeId::of`] is a `const fn`.
///
/// # Examples
///
/// ```ignore
/// task_deps![super::backup::BackupConfigs]
/// // expands to:
/// //   fn dependencies(&self) -> &[std::any::TypeId] {
/// //       const DEPS: &[std::any::TypeId] = &[
/// //           std::any::TypeId::of::<super::backup::BackupConfigs>(),
/// //       ];
/// //       DEPS
/// //   }
/// ```
macro_rules! task_deps {
    [$($dep:ty),+ $(,)?] => {
        fn dependencies(&self) -> &[std::any::TypeId] {
            const DEPS: &[std::any::TypeId] = &[$(std::any::TypeId::of::<$dep>()),+];
            DEPS
        }
    };
}

pub(crate) use task_deps;

pub use context::{BackupRecord, Context, HostFacts};
pub use processing::{ProcessOpts, TaskResult, TaskStats, process_resources};

use std::any::TypeId;

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable task.
///
/// The `'static` bound gives each task struct a stable [`TypeId`], which the
/// runner uses to match dependency declarations (see [`Task::task_id`] and
/// [`Task::dependencies`]).
pub trait Task: Send + Sync + 'static {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// The concrete `TypeId` of this task, used as a dependency identifier.
    fn task_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Tasks that must complete before this task starts.
    ///
    /// Use [`task_deps!`] to declare them. The default is no dependencies.
    fn dependencies(&self) -> &[TypeId] {
        &[]
    }

    /// Whether a failure of this task must abort the whole run.
    fn required(&self) -> bool {
        false
    }

    /// Whether this task should run on the current host.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when system
    /// commands fail or file operations are not permitted.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The complete set of tasks run by the install command, in declared order.
///
/// The runner keeps this order except where a dependency forces a task later.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(editor::InstallEditor),
        Box::new(tools::InstallMultiplexer),
        Box::new(tools::InstallShell),
        Box::new(shell::ConfigureShell),
        Box::new(tools::InstallTools),
        Box::new(dotfiles::SyncDotfiles),
        Box::new(backup::BackupConfigs),
        Box::new(symlinks::InstallSymlinks),
        Box::new(report::Report),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// Returns the recorded status, or the task's error after it has been logged
/// and recorded as failed.
///
/// # Errors
///
/// Returns the error produced by [`Task::run`].
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<TaskStatus> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(TaskStatus::NotApplicable);
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(TaskStatus::Ok)
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(TaskStatus::Skipped)
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            Ok(TaskStatus::DryRun)
        }
        Err(e) => {
            let msg = format!("{}: {e:#}", task.name());
            if task.required() {
                ctx.log.error(&msg);
            } else {
                ctx.log.warn(&msg);
            }
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}
