//! Package-managed tools: multiplexer, shell, and the auxiliary list.
use anyhow::Result;

use super::processing::process_single;
use super::{Context, ProcessOpts, Task, TaskResult, TaskStats, process_resources};
use crate::config::tools::Tool;
use crate::resources::Resource;
use crate::resources::package::PackageResource;

/// Build the package resource that provides `tool`.
pub(super) fn package_resource<'a>(ctx: &'a Context, tool: &Tool) -> PackageResource<'a> {
    PackageResource::new(
        &tool.name,
        &tool.package,
        &ctx.installer,
        ctx.executor.as_ref(),
        ctx.log.as_ref(),
    )
}

/// Install one tool unless its executable is already on `PATH`.
fn install_tool(ctx: &Context, tool: &Tool) -> Result<TaskResult> {
    process_resources(
        ctx,
        std::iter::once(package_resource(ctx, tool)),
        &ProcessOpts::apply_all("install"),
    )
}

/// Install the terminal multiplexer.
#[derive(Debug)]
pub struct InstallMultiplexer;

impl Task for InstallMultiplexer {
    fn name(&self) -> &'static str {
        "Install multiplexer"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        install_tool(ctx, &ctx.config.multiplexer)
    }
}

/// Install the interactive shell.
#[derive(Debug)]
pub struct InstallShell;

impl Task for InstallShell {
    fn name(&self) -> &'static str {
        "Install shell"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        install_tool(ctx, &ctx.config.shell)
    }
}

/// Install the auxiliary command-line tools one by one.
///
/// A failing tool does not stop the others; the task fails afterwards,
/// naming every tool that could not be installed.
#[derive(Debug)]
pub struct InstallTools;

impl Task for InstallTools {
    fn name(&self) -> &'static str {
        "Install tools"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.tools.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let opts = ProcessOpts::apply_all("install");
        let mut stats = TaskStats::new();
        let mut failed: Vec<&str> = Vec::new();

        for tool in &ctx.config.tools {
            let resource = package_resource(ctx, tool);
            let outcome = resource
                .current_state()
                .and_then(|state| process_single(ctx, &resource, state, &opts));
            match outcome {
                Ok(delta) => stats += delta,
                Err(e) => {
                    ctx.log.warn(&format!("failed to install {}: {e:#}", tool.name));
                    failed.push(&tool.name);
                }
            }
        }

        if !failed.is_empty() {
            ctx.log.info(&stats.summary(ctx.dry_run));
            anyhow::bail!("could not install: {}", failed.join(", "));
        }
        Ok(stats.finish(ctx))
    }
}
