use anyhow::Result;

use super::processing::process_single;
use super::{Context, ProcessOpts, Task, TaskResult, TaskStats, task_deps};
use crate::resources::Resource;
use crate::resources::shell::{DefaultShellResource, ShellFrameworkResource};

/// Directory the shell framework installs into, relative to `$HOME`.
const FRAMEWORK_DIR: &str = ".oh-my-zsh";

/// Install the shell framework and make zsh the login shell.
#[derive(Debug)]
pub struct ConfigureShell;

impl Task for ConfigureShell {
    fn name(&self) -> &'static str {
        "Configure shell"
    }

    task_deps![super::tools::InstallShell];

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.executor.which(&ctx.config.shell.name)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.privilege.is_root() {
            ctx.log
                .warn("running as root: leaving shell framework and login shell unchanged");
            return Ok(TaskResult::Skipped("running as root".to_string()));
        }

        let opts = ProcessOpts::apply_all("configure").no_bail();
        let mut stats = TaskStats::new();

        let framework = ShellFrameworkResource::new(
            ctx.home.join(FRAMEWORK_DIR),
            &ctx.config.shell_framework_url,
            ctx.executor.as_ref(),
        );
        stats += process_single(ctx, &framework, framework.current_state()?, &opts)?;

        let login = DefaultShellResource::new(
            &ctx.config.shell.name,
            &ctx.login_shell,
            ctx.executor.as_ref(),
        );
        stats += process_single(ctx, &login, login.current_state()?, &opts)?;

        Ok(stats.finish(ctx))
    }
}
