// Shared helpers for integration tests.
//
// Provides a temporary home directory and a scripted executor so each
// integration test can drive the install pipeline without touching the real
// system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use setup_env::config::Config;
use setup_env::exec::{ExecResult, Executor};
use setup_env::logging::{Log, Logger};
use setup_env::platform::{CpuArch, Os, Platform};
use setup_env::privilege::Privilege;
use setup_env::resources::package::PackageManager;
use setup_env::tasks::{Context, HostFacts};

/// Executor that records command lines and simulates a cooperative host:
/// installs put the package's binary on `PATH`, `git clone` writes the
/// dotfiles payload, everything else succeeds with canned output.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    lines: Mutex<Vec<String>>,
    present: Mutex<HashSet<String>>,
    failing: Vec<String>,
    dotfiles: PathBuf,
}

impl ScriptedExecutor {
    pub fn new(dotfiles: &Path, present: &[&str]) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            present: Mutex::new(present.iter().map(ToString::to_string).collect()),
            failing: Vec::new(),
            dotfiles: dotfiles.to_path_buf(),
        }
    }

    /// Fail every command whose line starts with `prefix`.
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lines lock").clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.lines.lock().expect("lines lock").push(line.clone());

        if self.failing.iter().any(|p| line.starts_with(p.as_str())) {
            return ExecResult {
                stdout: String::new(),
                stderr: "scripted failure".to_string(),
                success: false,
                code: Some(1),
            };
        }

        if program == "git" && args.first() == Some(&"clone") {
            write_dotfiles_payload(&self.dotfiles);
        }
        if line.contains("apt-get install -y ")
            && let Some(package) = args.last()
        {
            let binary = match *package {
                "neovim" => "nvim",
                "ripgrep" => "rg",
                other => other,
            };
            self.present
                .lock()
                .expect("present lock")
                .insert(binary.to_string());
        }

        let stdout = match line.as_str() {
            "which zsh" => "/usr/bin/zsh\n",
            "nvim --version" => "NVIM v0.10.2\nBuild type: Release\n",
            "tmux -V" => "tmux 3.4\n",
            "zsh --version" => "zsh 5.9 (x86_64-pc-linux-gnu)\n",
            _ => "",
        };
        ExecResult {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    fn checked(result: ExecResult) -> anyhow::Result<ExecResult> {
        if result.success {
            Ok(result)
        } else {
            anyhow::bail!("{}", result.stderr)
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Self::checked(self.record(program, args))
    }

    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        Self::checked(self.record(program, args))
    }

    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Self::checked(self.record(program, args))
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn which(&self, program: &str) -> bool {
        self.present.lock().expect("present lock").contains(program)
    }
}

/// The files a dotfiles clone provides for the default symlink set.
pub fn write_dotfiles_payload(dotfiles: &Path) {
    std::fs::create_dir_all(dotfiles.join("nvim")).expect("create nvim dir");
    std::fs::write(dotfiles.join("nvim").join("init.lua"), "-- config").expect("write init.lua");
    for name in [".zshrc", ".tmux.conf", ".gitconfig"] {
        std::fs::write(dotfiles.join(name), name).expect("write dotfile");
    }
}

/// An isolated home directory backed by a [`tempfile::TempDir`].
pub struct TestHome {
    pub dir: tempfile::TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp home"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn dotfiles(&self) -> PathBuf {
        self.dir.path().join(".dotfiles")
    }

    /// Build a non-root apt context on `x86_64` Linux for this home.
    pub fn context(&self, executor: Arc<dyn Executor>, log: &Arc<Logger>) -> Context {
        let facts = HostFacts {
            platform: Platform::new(Os::Linux, CpuArch::X86_64),
            privilege: Privilege::from_is_root(false),
            package_manager: PackageManager::Apt,
            home: self.path().to_path_buf(),
            login_shell: "/bin/bash".to_string(),
        };
        Context::new(
            Config::defaults(self.path()),
            facts,
            Arc::clone(log) as Arc<dyn Log>,
            executor,
            false,
        )
    }
}
