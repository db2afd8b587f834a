use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, run_tasks};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::tasks::{self, Context, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if host detection or configuration loading fails, or if
/// a required task (the dotfiles sync) fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("setup-env {}", super::version::version()));
    if global.dry_run {
        log.info("dry run: no changes will be made");
    }

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = CommandSetup::init(global, executor.as_ref(), log)?;
    let ctx = setup.into_context(log, executor, global.dry_run);
    install(&ctx, opts, log)
}

/// Run every install task against an existing context.
///
/// # Errors
///
/// Returns an error if a required task fails or the task graph is invalid.
pub fn install(ctx: &Context, opts: &InstallOpts, log: &Logger) -> Result<()> {
    let all_tasks = tasks::all_install_tasks();
    let task_refs: Vec<&dyn Task> = all_tasks.iter().map(Box::as_ref).collect();
    run_tasks(&task_refs, ctx, log, opts)
}
