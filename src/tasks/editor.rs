//! Editor provisioning through an ordered chain of install strategies.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::error::InstallError;
use crate::platform::CpuArch;
use crate::resources::helpers::download::download;

/// Where the release archive's contents are copied.
const INSTALL_PREFIX: &str = "/usr/local/";

/// Upstream branch built by the source strategy.
const SOURCE_BRANCH: &str = "stable";

/// One way of getting the editor onto the system.
pub trait InstallStrategy: std::fmt::Debug + Send + Sync {
    /// Short label used in logs and the failure summary.
    fn name(&self) -> &'static str;

    /// Attempt the installation.
    ///
    /// # Errors
    ///
    /// Returns an error if this strategy could not install the editor.
    fn install(&self, ctx: &Context) -> Result<()>;
}

/// Install the editor package through the detected package manager.
#[derive(Debug)]
pub struct PackageStrategy;

impl InstallStrategy for PackageStrategy {
    fn name(&self) -> &'static str {
        "package manager"
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        ctx.install_package(&ctx.config.editor.package)
    }
}

/// Download the prebuilt archive for this CPU and copy it under `/usr/local`.
#[derive(Debug)]
pub struct ReleaseArchive;

impl ReleaseArchive {
    /// Archive file name for `arch`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedArchitecture`] when no prebuilt
    /// archive exists for `arch`.
    pub fn archive_name(arch: &CpuArch) -> Result<&'static str, InstallError> {
        match arch {
            CpuArch::X86_64 => Ok("nvim-linux-x86_64.tar.gz"),
            CpuArch::Aarch64 => Ok("nvim-linux-arm64.tar.gz"),
            CpuArch::Other(name) => Err(InstallError::UnsupportedArchitecture(name.clone())),
        }
    }
}

impl InstallStrategy for ReleaseArchive {
    fn name(&self) -> &'static str {
        "release archive"
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        if !ctx.platform.is_linux() {
            anyhow::bail!("release archives are only published for Linux");
        }
        let archive = Self::archive_name(&ctx.platform.arch)?;
        let url = format!(
            "{}/{archive}",
            ctx.config.editor_release_url.trim_end_matches('/')
        );

        let tmp = tempfile::tempdir().context("create temporary directory")?;
        let archive_path = tmp.path().join(archive);
        download(ctx.executor.as_ref(), &url, &archive_path)?;

        let tmp_str = tmp.path().to_str().context("temp path is not valid UTF-8")?;
        let archive_str = archive_path
            .to_str()
            .context("archive path is not valid UTF-8")?;
        ctx.executor
            .run("tar", &["-xzf", archive_str, "-C", tmp_str])?;

        let unpacked = tmp.path().join(archive.trim_end_matches(".tar.gz"));
        let contents = format!("{}/.", unpacked.display());
        ctx.run_privileged("cp", &["-r", &contents, INSTALL_PREFIX])
            .context("copy release into /usr/local")?;
        Ok(())
    }
}

/// Shallow-clone the upstream source and build it.
#[derive(Debug)]
pub struct SourceBuild;

impl InstallStrategy for SourceBuild {
    fn name(&self) -> &'static str {
        "source build"
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        for dep in ctx.config.build_deps_for(ctx.installer.manager()) {
            if let Err(e) = ctx.install_package(&dep) {
                ctx.log
                    .warn(&format!("build prerequisite {dep} not installed: {e:#}"));
            }
        }

        let tmp = tempfile::tempdir().context("create temporary directory")?;
        let src = tmp.path().join("neovim");
        let src_str = src.to_str().context("source path is not valid UTF-8")?;

        ctx.executor.run(
            "git",
            &[
                "clone",
                "--depth",
                "1",
                "--branch",
                SOURCE_BRANCH,
                &ctx.config.editor_source_url,
                src_str,
            ],
        )?;
        ctx.executor
            .run_in(&src, "make", &["CMAKE_BUILD_TYPE=RelWithDebInfo"])?;
        ctx.run_privileged("make", &["-C", src_str, "install"])?;
        Ok(())
    }
}

/// The fallback chain, tried in order until one succeeds.
#[must_use]
pub fn strategies() -> Vec<Box<dyn InstallStrategy>> {
    vec![
        Box::new(PackageStrategy),
        Box::new(ReleaseArchive),
        Box::new(SourceBuild),
    ]
}

/// Install the editor: package manager, else release archive, else source.
#[derive(Debug)]
pub struct InstallEditor;

impl Task for InstallEditor {
    fn name(&self) -> &'static str {
        "Install editor"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let editor = &ctx.config.editor;
        if ctx.executor.which(&editor.name) {
            return Ok(TaskResult::Skipped(format!("{} already installed", editor.name)));
        }

        let chain = strategies();
        if ctx.dry_run {
            let names: Vec<&str> = chain.iter().map(|s| s.name()).collect();
            ctx.log.dry_run(&format!(
                "would install {} via {}",
                editor.name,
                names.join(", then ")
            ));
            return Ok(TaskResult::DryRun);
        }

        let mut attempts = Vec::new();
        for strategy in &chain {
            ctx.log
                .info(&format!("installing {} via {}", editor.name, strategy.name()));
            match strategy.install(ctx) {
                Ok(()) => {
                    ctx.log
                        .info(&format!("installed {} via {}", editor.name, strategy.name()));
                    return Ok(TaskResult::Ok);
                }
                Err(e) => {
                    ctx.log.warn(&format!("{} failed: {e:#}", strategy.name()));
                    attempts.push(format!("{}: {e:#}", strategy.name()));
                }
            }
        }

        Err(InstallError::NoStrategySucceeded {
            tool: editor.name.clone(),
            attempts: attempts.join("; "),
        }
        .into())
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::resources::package::PackageManager;
    use crate::resources::test_helpers::RecordingExecutor;
    use crate::tasks::test_helpers::ContextBuilder;
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn archive_names_by_arch() {
        assert_eq!(
            ReleaseArchive::archive_name(&CpuArch::X86_64).unwrap(),
            "nvim-linux-x86_64.tar.gz"
        );
        assert_eq!(
            ReleaseArchive::archive_name(&CpuArch::Aarch64).unwrap(),
            "nvim-linux-arm64.tar.gz"
        );
        assert!(matches!(
            ReleaseArchive::archive_name(&CpuArch::Other("riscv64".to_string())),
            Err(InstallError::UnsupportedArchitecture(name)) if name == "riscv64"
        ));
    }

    #[test]
    fn chain_order_is_package_archive_source() {
        let names: Vec<&str> = strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["package manager", "release archive", "source build"]);
    }

    #[test]
    fn editor_present_issues_no_commands() {
        let exec = Arc::new(RecordingExecutor::new().with_present(&["nvim", "curl"]));
        let ctx = ContextBuilder::new(exec.clone()).build();
        let result = InstallEditor.run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::Skipped(_)));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn package_manager_success_stops_chain() {
        let exec = Arc::new(RecordingExecutor::new().with_present(&["curl"]));
        let ctx = ContextBuilder::new(exec.clone()).root(true).build();
        InstallEditor.run(&ctx).unwrap();
        assert_eq!(
            exec.lines(),
            vec![
                "apt-get update",
                "env DEBIAN_FRONTEND=noninteractive apt-get install -y neovim",
            ]
        );
    }

    #[test]
    fn falls_back_to_release_archive() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_present(&["curl"])
                .failing("sudo dnf install -y neovim"),
        );
        let ctx = ContextBuilder::new(exec.clone())
            .manager(PackageManager::Dnf)
            .arch(CpuArch::Aarch64)
            .build();
        InstallEditor.run(&ctx).unwrap();

        let calls = exec.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[1].program, "curl");
        assert!(
            calls[1]
                .args
                .last()
                .unwrap()
                .ends_with("/nvim-linux-arm64.tar.gz")
        );
        assert_eq!(calls[2].program, "tar");
        assert_eq!(calls[2].args[0], "-xzf");
        assert_eq!(calls[3].program, "sudo");
        assert_eq!(calls[3].args[0], "cp");
        assert!(calls[3].args[2].ends_with("nvim-linux-arm64/."));
        assert_eq!(calls[3].args[3], "/usr/local/");
    }

    #[test]
    fn unsupported_arch_goes_straight_to_source_build() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_present(&["curl"])
                .failing("pacman -S --needed --noconfirm neovim"),
        );
        let ctx = ContextBuilder::new(exec.clone())
            .root(true)
            .manager(PackageManager::Pacman)
            .arch(CpuArch::Other("riscv64".to_string()))
            .build();
        InstallEditor.run(&ctx).unwrap();

        let lines = exec.lines();
        assert!(!lines.iter().any(|l| l.starts_with("curl")));
        assert!(lines.contains(&"pacman -S --needed --noconfirm base-devel".to_string()));
        assert!(!lines.iter().any(|l| l.ends_with("build-essential")));
        assert!(lines.iter().any(|l| l.starts_with("git clone --depth 1 --branch stable")));
        assert!(lines.contains(&"make CMAKE_BUILD_TYPE=RelWithDebInfo".to_string()));
        assert!(lines.last().unwrap().starts_with("make -C "));
        assert!(lines.last().unwrap().ends_with(" install"));
    }

    #[test]
    fn build_prerequisite_failures_are_tolerated() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .failing("apk add --no-cache neovim")
                .failing("apk add --no-cache build-base"),
        );
        let ctx = ContextBuilder::new(exec.clone())
            .root(true)
            .manager(PackageManager::Apk)
            .build();
        // No downloader: the archive strategy fails, the source build still runs.
        InstallEditor.run(&ctx).unwrap();
        assert!(exec.lines().iter().any(|l| l.starts_with("make -C ")));
    }

    #[test]
    fn all_strategies_failing_is_typed_error() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_present(&["curl"])
                .failing("sudo env DEBIAN_FRONTEND=noninteractive apt-get install -y neovim")
                .failing("curl")
                .failing("git clone"),
        );
        let ctx = ContextBuilder::new(exec).build();
        let err = InstallEditor.run(&ctx).unwrap_err();
        let Some(InstallError::NoStrategySucceeded { tool, attempts }) =
            err.downcast_ref::<InstallError>()
        else {
            panic!("expected NoStrategySucceeded, got {err:?}");
        };
        assert_eq!(tool, "nvim");
        assert!(attempts.contains("package manager"));
        assert!(attempts.contains("release archive"));
        assert!(attempts.contains("source build"));
    }

    #[test]
    fn archive_scratch_dir_removed_after_install() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_present(&["curl"])
                .failing("sudo env DEBIAN_FRONTEND=noninteractive apt-get install -y neovim"),
        );
        let ctx = ContextBuilder::new(exec.clone()).build();
        InstallEditor.run(&ctx).unwrap();

        let tar = exec.calls().into_iter().find(|c| c.program == "tar").unwrap();
        assert_eq!(tar.args[2], "-C");
        let scratch = Path::new(&tar.args[3]);
        assert!(scratch.is_absolute());
        assert!(!scratch.exists());
    }

    #[test]
    fn scratch_dirs_removed_when_every_strategy_fails() {
        let exec = Arc::new(
            RecordingExecutor::new()
                .with_present(&["curl"])
                .failing("sudo env DEBIAN_FRONTEND=noninteractive apt-get install -y neovim")
                .failing("tar")
                .failing("git clone"),
        );
        let ctx = ContextBuilder::new(exec.clone()).build();
        assert!(InstallEditor.run(&ctx).is_err());

        let calls = exec.calls();
        let tar = calls.iter().find(|c| c.program == "tar").unwrap();
        assert!(!Path::new(&tar.args[3]).exists());
        let clone = calls
            .iter()
            .find(|c| c.program == "git" && c.args[0] == "clone")
            .unwrap();
        let checkout = Path::new(clone.args.last().unwrap());
        assert!(checkout.ends_with("neovim"));
        assert!(!checkout.parent().unwrap().exists());
    }

    #[test]
    fn dry_run_issues_no_commands() {
        let exec = Arc::new(RecordingExecutor::new());
        let ctx = ContextBuilder::new(exec.clone()).dry_run(true).build();
        assert!(matches!(InstallEditor.run(&ctx).unwrap(), TaskResult::DryRun));
        assert!(exec.calls().is_empty());
    }
}
