pub mod install;
pub mod report;
pub mod version;

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::Config;
use crate::error::TaskError;
use crate::exec::Executor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::tasks::{self, Context, HostFacts, Task, graph};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates host detection and configuration loading so that each
/// command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    pub facts: HostFacts,
    pub config: Config,
}

impl CommandSetup {
    /// Snapshot the host and load the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or the config file fails to load.
    pub fn init(global: &GlobalOpts, executor: &dyn Executor, log: &Logger) -> Result<Self> {
        log.stage("Detecting host");
        let facts = HostFacts::detect(executor)?;
        log.info(&format!(
            "platform: {} {}",
            facts.platform.os, facts.platform.arch
        ));
        log.info(&format!("package manager: {}", facts.package_manager));
        if facts.privilege.is_root() {
            log.info("running as root");
        } else {
            log.info(&format!(
                "privileged commands use `{}`",
                facts.privilege.prefix()
            ));
        }

        let config = Config::load(&facts.home, global)?;
        log.debug(&format!("repository: {}", config.repo_url));
        log.debug(&format!("dotfiles dir: {}", config.dotfiles_dir.display()));
        log.debug(&format!("{} symlinks", config.symlinks.len()));
        log.debug(&format!("{} auxiliary tools", config.tools.len()));

        Ok(Self { facts, config })
    }

    /// Turn the setup into an execution context.
    #[must_use]
    pub fn into_context(self, log: &Arc<Logger>, executor: Arc<dyn Executor>, dry_run: bool) -> Context {
        Context::new(
            self.config,
            self.facts,
            Arc::clone(log) as Arc<dyn Log>,
            executor,
            dry_run,
        )
    }
}

/// Whether `task` passes the `--skip` / `--only` filters.
///
/// Matching is a case-insensitive substring test on the task name. `--only`
/// takes precedence over `--skip`.
#[must_use]
pub fn is_selected(task: &dyn Task, opts: &InstallOpts) -> bool {
    let name = task.name().to_lowercase();
    if !opts.only.is_empty() {
        return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
    }
    !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()))
}

/// Execute tasks in dependency order, print the summary, and stop at the
/// first failed required task.
///
/// Failures of other tasks are reported as warnings and do not fail the run.
/// A task whose dependency was filtered out or failed is recorded as not
/// applicable instead of running, unless the task is required; this holds
/// transitively.
///
/// # Errors
///
/// Returns [`TaskError::DependencyCycle`] or [`TaskError::MissingDependency`]
/// if the tasks cannot be ordered, and [`TaskError::Aborted`] if a required
/// task fails.
pub fn run_tasks(
    tasks: &[&dyn Task],
    ctx: &Context,
    log: &Logger,
    opts: &InstallOpts,
) -> Result<()> {
    let order = graph::execution_order(tasks)?;
    let mut not_run: HashMap<TypeId, &str> = HashMap::new();

    for task in order.into_iter().filter_map(|i| tasks.get(i)) {
        if !is_selected(*task, opts) {
            log.debug(&format!("skipping task: {} (filtered)", task.name()));
            log.record_task(task.name(), TaskStatus::NotApplicable, Some("filtered"));
            not_run.insert(task.task_id(), task.name());
            continue;
        }

        if !task.required()
            && let Some(dep) = task.dependencies().iter().find_map(|d| not_run.get(d))
        {
            let reason = format!("dependency not run: {dep}");
            log.debug(&format!("skipping task: {} ({reason})", task.name()));
            log.record_task(task.name(), TaskStatus::NotApplicable, Some(&reason));
            not_run.insert(task.task_id(), task.name());
            continue;
        }

        if let Err(e) = tasks::execute(*task, ctx) {
            if task.required() {
                log.print_summary();
                return Err(TaskError::Aborted {
                    task: task.name().to_string(),
                    reason: format!("{e:#}"),
                }
                .into());
            }
            not_run.insert(task.task_id(), task.name());
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        log.warn(&format!("{count} task(s) failed; see warnings above"));
    }
    Ok(())
}
