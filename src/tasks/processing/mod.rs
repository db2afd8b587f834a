//! Generic resource processing loop: check state, apply, collect stats.
//!
//! Single-resource handling lives in [`apply`].

mod apply;

pub(crate) use apply::process_single;

use anyhow::Result;

use super::context::Context;
use crate::resources::Resource;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use setup_env::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("already installed".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task had nothing to do (e.g. tool already present).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for batch tasks that process many items.
///
/// # Examples
///
/// ```
/// use setup_env::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// assert_eq!(stats.summary(true), "1 would change, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items skipped due to errors or inapplicability.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Configuration for the generic resource processing loop.
///
/// # Examples
///
/// ```
/// use setup_env::tasks::ProcessOpts;
///
/// // Fix everything, bail on errors (strict):
/// let opts = ProcessOpts::apply_all("link");
/// assert!(opts.bail_on_error);
///
/// // Fix everything, warn on errors (lenient):
/// let opts = ProcessOpts::apply_all("install").no_bail();
/// assert!(!opts.bail_on_error);
/// ```
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "install", "link").
    pub verb: &'a str,
    /// Propagate errors from `apply()` (bail). If `false`, warn and count as skipped.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Apply every missing or incorrect resource, bailing on errors.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            bail_on_error: true,
        }
    }

    /// Warn on errors instead of bailing.
    #[must_use]
    pub const fn no_bail(mut self) -> Self {
        self.bail_on_error = false;
        self
    }
}

/// Process resources by checking each one's current state and applying as needed.
///
/// # Errors
///
/// Returns an error if any resource fails to check its state, or fails to
/// apply when `bail_on_error` is set. Otherwise failures are logged as
/// warnings and counted as skipped.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats.finish(ctx))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::{Applicable, ResourceChange, ResourceState};
    use crate::tasks::test_helpers::{ContextBuilder, WhichExecutor};
    use std::sync::Arc;

    /// A configurable mock resource for testing the processing pipeline.
    pub(super) struct MockResource {
        state_result: Result<ResourceState, String>,
        apply_result: Result<ResourceChange, String>,
    }

    impl MockResource {
        pub(super) const fn new(state: ResourceState) -> Self {
            Self {
                state_result: Ok(state),
                apply_result: Ok(ResourceChange::Applied),
            }
        }

        pub(super) fn with_apply(mut self, result: Result<ResourceChange, String>) -> Self {
            self.apply_result = result;
            self
        }

        fn with_state_error(mut self, err: &str) -> Self {
            self.state_result = Err(err.to_string());
            self
        }
    }

    impl Applicable for MockResource {
        fn description(&self) -> String {
            "mock resource".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            self.apply_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    impl Resource for MockResource {
        fn current_state(&self) -> Result<ResourceState> {
            self.state_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn context(dry_run: bool) -> Context {
        ContextBuilder::new(Arc::new(WhichExecutor::default()))
            .dry_run(dry_run)
            .build()
    }

    #[test]
    fn stats_summary_changed_only() {
        let stats = TaskStats {
            changed: 3,
            already_ok: 0,
            skipped: 0,
        };
        assert_eq!(stats.summary(false), "3 changed, 0 already ok");
    }

    #[test]
    fn stats_finish_returns_dry_run_result() {
        let result = TaskStats::new().finish(&context(true));
        assert!(matches!(result, TaskResult::DryRun));
    }

    #[test]
    fn stats_finish_returns_ok_result() {
        let result = TaskStats::new().finish(&context(false));
        assert!(matches!(result, TaskResult::Ok));
    }

    #[test]
    fn process_resources_mixed_states() {
        let ctx = context(false);
        let resources = vec![
            MockResource::new(ResourceState::Correct),
            MockResource::new(ResourceState::Missing),
            MockResource::new(ResourceState::Invalid {
                reason: "source missing".to_string(),
            }),
        ];
        let result =
            process_resources(&ctx, resources, &ProcessOpts::apply_all("link")).unwrap();
        assert!(matches!(result, TaskResult::Ok));
    }

    #[test]
    fn process_resources_bails_on_apply_error() {
        let ctx = context(false);
        let resources = vec![
            MockResource::new(ResourceState::Missing).with_apply(Err("boom".to_string())),
        ];
        assert!(process_resources(&ctx, resources, &ProcessOpts::apply_all("link")).is_err());
    }

    #[test]
    fn process_resources_no_bail_continues() {
        let ctx = context(false);
        let resources = vec![
            MockResource::new(ResourceState::Missing).with_apply(Err("boom".to_string())),
            MockResource::new(ResourceState::Missing),
        ];
        let result =
            process_resources(&ctx, resources, &ProcessOpts::apply_all("install").no_bail());
        assert!(result.is_ok());
    }

    #[test]
    fn process_resources_propagates_state_error() {
        let ctx = context(false);
        let resources = vec![MockResource::new(ResourceState::Missing).with_state_error("io")];
        assert!(
            process_resources(&ctx, resources, &ProcessOpts::apply_all("link").no_bail())
                .is_err()
        );
    }

    #[test]
    fn process_resources_dry_run_never_applies() {
        let ctx = context(true);
        let resources = vec![
            MockResource::new(ResourceState::Missing).with_apply(Err("should not call".into())),
        ];
        let result =
            process_resources(&ctx, resources, &ProcessOpts::apply_all("link")).unwrap();
        assert!(matches!(result, TaskResult::DryRun));
    }
}
