//! Command: print installed tool versions.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, run_tasks};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::tasks::report::Report;

/// Run the report command.
///
/// # Errors
///
/// Returns an error if host detection or configuration loading fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let setup = CommandSetup::init(global, executor.as_ref(), log)?;
    let ctx = setup.into_context(log, executor, global.dry_run);
    run_tasks(&[&Report], &ctx, log, &InstallOpts::default())
}
