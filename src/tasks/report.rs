use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::tools::Tool;

/// First line of `tool`'s version output, or `None` if it is absent or the
/// query fails.
fn version_line(ctx: &Context, tool: &Tool) -> Option<String> {
    if !ctx.executor.which(&tool.name) {
        return None;
    }
    let args: Vec<&str> = tool.version_args.iter().map(String::as_str).collect();
    let result = ctx.executor.run_unchecked(&tool.name, &args).ok()?;
    if !result.success {
        return None;
    }
    result
        .stdout
        .lines()
        .chain(result.stderr.lines())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(ToString::to_string)
}

/// Print installed tool versions and what to do next.
#[derive(Debug)]
pub struct Report;

impl Task for Report {
    fn name(&self) -> &'static str {
        "Report"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        for tool in ctx.config.core_tools() {
            match version_line(ctx, tool) {
                Some(line) => ctx.log.info(&format!("{}: {line}", tool.name)),
                None => ctx.log.debug(&format!("{}: not available", tool.name)),
            }
        }
        for tool in &ctx.config.tools {
            if let Some(line) = version_line(ctx, tool) {
                ctx.log.debug(&format!("{}: {line}", tool.name));
            }
        }

        ctx.log.info("next steps:");
        ctx.log.info("  open a new terminal (or run `exec zsh`) to load the shell config");
        ctx.log
            .info("  start nvim once to let the plugin manager sync");
        if let Some(dir) = ctx.backup().dir {
            ctx.log
                .info(&format!("  previous configuration saved in {}", dir.display()));
        }
        Ok(TaskResult::Ok)
    }
}
