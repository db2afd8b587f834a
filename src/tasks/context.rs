use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;

use crate::config::Config;
use crate::exec::{ExecResult, Executor};
use crate::logging::Log;
use crate::platform::Platform;
use crate::privilege::Privilege;
use crate::resources::package::{PackageInstaller, PackageManager};

/// Facts about the host captured once at startup.
#[derive(Debug, Clone)]
pub struct HostFacts {
    /// Operating system and CPU architecture.
    pub platform: Platform,
    /// Whether the process is root and which elevation prefix applies.
    pub privilege: Privilege,
    /// First package manager found on `PATH`.
    pub package_manager: PackageManager,
    /// User's home directory.
    pub home: PathBuf,
    /// The login shell from `$SHELL` (empty when unset).
    pub login_shell: String,
}

impl HostFacts {
    /// Inspect the running system.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is not set.
    pub fn detect(executor: &dyn Executor) -> Result<Self> {
        Ok(Self {
            platform: Platform::detect(),
            privilege: Privilege::detect(),
            package_manager: PackageManager::detect(executor),
            home: home_dir()?,
            login_shell: std::env::var("SHELL").unwrap_or_default(),
        })
    }
}

/// Return the user's home directory from `HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is not set.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))
}

/// What the backup task saved, consumed by the symlink task.
#[derive(Debug, Default, Clone)]
pub struct BackupRecord {
    /// Directory created for this run's backup.
    pub dir: Option<PathBuf>,
    /// Original target paths copied into `dir`.
    pub saved: Vec<PathBuf>,
}

/// Shared context for task execution.
pub struct Context {
    /// Effective configuration (defaults, file overlay, CLI overrides).
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Platform,
    /// Privilege level of the process.
    pub privilege: Privilege,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// User's home directory path.
    pub home: PathBuf,
    /// The login shell at startup.
    pub login_shell: String,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Package installer bound to the detected manager.
    pub installer: Arc<PackageInstaller>,
    backup: Mutex<BackupRecord>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("privilege", &self.privilege)
            .field("package_manager", &self.installer.manager())
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("executor", &"<dyn Executor>")
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        config: Config,
        facts: HostFacts,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> Self {
        let installer = Arc::new(PackageInstaller::new(
            facts.package_manager,
            facts.privilege.clone(),
        ));
        Self {
            config: Arc::new(config),
            platform: facts.platform,
            privilege: facts.privilege,
            log,
            dry_run,
            home: facts.home,
            login_shell: facts.login_shell,
            executor,
            installer,
            backup: Mutex::new(BackupRecord::default()),
        }
    }

    /// Local clone of the dotfiles repository.
    #[must_use]
    pub fn dotfiles_dir(&self) -> &Path {
        &self.config.dotfiles_dir
    }

    /// Run `program args…` through the privilege wrapper.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    pub fn run_privileged(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let (program, args) = self.privilege.command(program, args);
        self.executor.run(program, &args)
    }

    /// Install a package through the detected package manager.
    ///
    /// # Errors
    ///
    /// Returns an error if no package manager is available or the install fails.
    pub fn install_package(&self, package: &str) -> Result<()> {
        self.installer
            .install(package, self.executor.as_ref(), self.log.as_ref())
    }

    /// Store the backup task's results for later tasks.
    pub fn record_backup(&self, record: BackupRecord) {
        *self.backup.lock().unwrap_or_else(PoisonError::into_inner) = record;
    }

    /// A copy of the backup record (empty when no backup ran).
    #[must_use]
    pub fn backup(&self) -> BackupRecord {
        self.backup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `path` was copied into this run's backup directory.
    #[must_use]
    pub fn was_backed_up(&self, path: &Path) -> bool {
        self.backup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .saved
            .iter()
            .any(|p| p == path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::RecordingExecutor;
    use crate::tasks::test_helpers::{ContextBuilder, WhichExecutor};

    #[test]
    fn dotfiles_dir_comes_from_config() {
        let ctx = ContextBuilder::new(Arc::new(WhichExecutor::default())).build();
        assert_eq!(ctx.dotfiles_dir(), ctx.home.join(".dotfiles"));
    }

    #[test]
    fn run_privileged_prefixes_when_not_root() {
        let exec = Arc::new(RecordingExecutor::new());
        let ctx = ContextBuilder::new(exec.clone()).root(false).build();
        ctx.run_privileged("make", &["install"]).unwrap();
        assert_eq!(exec.lines(), vec!["sudo make install"]);
    }

    #[test]
    fn run_privileged_plain_when_root() {
        let exec = Arc::new(RecordingExecutor::new());
        let ctx = ContextBuilder::new(exec.clone()).root(true).build();
        ctx.run_privileged("make", &["install"]).unwrap();
        assert_eq!(exec.lines(), vec!["make install"]);
    }

    #[test]
    fn backup_record_round_trip() {
        let ctx = ContextBuilder::new(Arc::new(WhichExecutor::default())).build();
        assert!(ctx.backup().dir.is_none());
        let target = ctx.home.join(".zshrc");
        ctx.record_backup(BackupRecord {
            dir: Some(ctx.home.join(".dotfiles_backup_x")),
            saved: vec![target.clone()],
        });
        assert!(ctx.was_backed_up(&target));
        assert!(!ctx.was_backed_up(&ctx.home.join(".tmux.conf")));
    }

    #[test]
    fn backup_record_survives_poisoned_lock() {
        let ctx = ContextBuilder::new(Arc::new(WhichExecutor::default())).build();
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = ctx.backup.lock().unwrap();
                    panic!("poison the backup lock");
                })
                .join();
        });
        assert!(ctx.backup.is_poisoned());

        let target = ctx.home.join(".gitconfig");
        ctx.record_backup(BackupRecord {
            dir: Some(ctx.home.join(".dotfiles_backup_y")),
            saved: vec![target.clone()],
        });
        assert!(ctx.was_backed_up(&target));
        assert_eq!(ctx.backup().saved, vec![target]);
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = ContextBuilder::new(Arc::new(WhichExecutor::default())).build();
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("package_manager"));
    }
}
