//! Package manager detection, installation, and the per-tool package resource.
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context as _, Result};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::InstallError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::privilege::Privilege;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian / Ubuntu (`apt-get`).
    Apt,
    /// Fedora (`dnf`).
    Dnf,
    /// RHEL / CentOS (`yum`).
    Yum,
    /// Arch Linux (`pacman`).
    Pacman,
    /// Alpine (`apk`).
    Apk,
    /// Homebrew.
    Brew,
    /// None of the above is available.
    Unknown,
}

/// Executables probed during detection, in priority order.
const PROBE_ORDER: [(&str, PackageManager); 6] = [
    ("apt-get", PackageManager::Apt),
    ("dnf", PackageManager::Dnf),
    ("yum", PackageManager::Yum),
    ("pacman", PackageManager::Pacman),
    ("apk", PackageManager::Apk),
    ("brew", PackageManager::Brew),
];

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Dnf => write!(f, "dnf"),
            Self::Yum => write!(f, "yum"),
            Self::Pacman => write!(f, "pacman"),
            Self::Apk => write!(f, "apk"),
            Self::Brew => write!(f, "brew"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl PackageManager {
    /// Return the first package manager whose executable is on `PATH`.
    ///
    /// Only checks presence; nothing is invoked.
    #[must_use]
    pub fn detect(executor: &dyn Executor) -> Self {
        PROBE_ORDER
            .iter()
            .find(|(program, _)| executor.which(program))
            .map_or(Self::Unknown, |(_, manager)| *manager)
    }

    /// Whether installs through this manager run with the elevation prefix.
    #[must_use]
    pub const fn needs_privilege(self) -> bool {
        !matches!(self, Self::Brew | Self::Unknown)
    }
}

/// A fully-resolved install invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InstallCommand<'a> {
    program: &'static str,
    args: Vec<&'a str>,
    env: &'static [(&'static str, &'static str)],
}

fn install_command(manager: PackageManager, package: &str) -> Option<InstallCommand<'_>> {
    let (program, mut args, env): (_, Vec<&str>, &'static [(&str, &str)]) = match manager {
        PackageManager::Apt => (
            "env",
            vec![
                "DEBIAN_FRONTEND=noninteractive",
                "apt-get",
                "install",
                "-y",
            ],
            &[],
        ),
        PackageManager::Dnf => ("dnf", vec!["install", "-y"], &[]),
        PackageManager::Yum => ("yum", vec!["install", "-y"], &[]),
        PackageManager::Pacman => ("pacman", vec!["-S", "--needed", "--noconfirm"], &[]),
        PackageManager::Apk => ("apk", vec!["add", "--no-cache"], &[]),
        PackageManager::Brew => ("brew", vec!["install"], &[("NONINTERACTIVE", "1")]),
        PackageManager::Unknown => return None,
    };
    args.push(package);
    Some(InstallCommand { program, args, env })
}

/// The one-off refresh run before the first install, for managers that need
/// one. pacman syncs and upgrades together so later installs never run
/// against a newer index than the installed system.
fn refresh_command(manager: PackageManager) -> Option<(&'static str, &'static [&'static str])> {
    match manager {
        PackageManager::Apt => Some(("apt-get", &["update"])),
        PackageManager::Pacman => Some(("pacman", &["-Syu", "--noconfirm"])),
        _ => None,
    }
}

/// Installs logical packages through the detected package manager.
///
/// The index refresh runs at most once per installer, before the first
/// install; its failure is logged and otherwise ignored.
#[derive(Debug)]
pub struct PackageInstaller {
    manager: PackageManager,
    privilege: Privilege,
    refreshed: AtomicBool,
}

impl PackageInstaller {
    #[must_use]
    pub const fn new(manager: PackageManager, privilege: Privilege) -> Self {
        Self {
            manager,
            privilege,
            refreshed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn manager(&self) -> PackageManager {
        self.manager
    }

    /// Install `package`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedPackageManager`] when no manager was
    /// detected, or the underlying command error when the install fails.
    pub fn install(&self, package: &str, executor: &dyn Executor, log: &dyn Log) -> Result<()> {
        let Some(cmd) = install_command(self.manager, package) else {
            return Err(InstallError::UnsupportedPackageManager {
                package: package.to_string(),
            }
            .into());
        };

        self.refresh_index(executor, log);

        log.debug(&format!("installing {package} via {}", self.manager));
        let result = if self.manager.needs_privilege() {
            let (program, args) = self.privilege.command(cmd.program, &cmd.args);
            executor.run(program, &args)
        } else {
            executor.run_with_env(cmd.program, &cmd.args, cmd.env)
        };
        result.with_context(|| format!("install {package} via {}", self.manager))?;
        Ok(())
    }

    fn refresh_index(&self, executor: &dyn Executor, log: &dyn Log) {
        let Some((program, args)) = refresh_command(self.manager) else {
            return;
        };
        if self.refreshed.swap(true, Ordering::SeqCst) {
            return;
        }
        log.debug(&format!("refreshing {} package index", self.manager));
        let (program, args) = self.privilege.command(program, args);
        if let Err(e) = executor.run(program, &args) {
            log.warn(&format!("{} index refresh failed, continuing: {e:#}", self.manager));
        }
    }
}

/// A tool provided by a system package: present when its executable is on
/// `PATH`, installed through the [`PackageInstaller`] otherwise.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Executable looked up on `PATH`.
    pub binary: String,
    /// Package that provides the executable.
    pub package: String,
    installer: &'a PackageInstaller,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl<'a> PackageResource<'a> {
    #[must_use]
    pub fn new(
        binary: &str,
        package: &str,
        installer: &'a PackageInstaller,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            binary: binary.to_string(),
            package: package.to_string(),
            installer,
            executor,
            log,
        }
    }
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.package, self.installer.manager())
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.installer
            .install(&self.package, self.executor, self.log)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PackageResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.executor.which(&self.binary) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
