use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "setup-env",
    about = "Bootstrap a fresh machine from a personal dotfiles repository",
    version
)]
pub struct Cli {
    /// Subcommand to run; defaults to `install`
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The subcommand to run, with `install` as the default.
    #[must_use]
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Install(InstallOpts::default()))
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// TOML file overriding the built-in configuration
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the dotfiles repository URL
    #[arg(long, global = true, value_name = "URL")]
    pub repo: Option<String>,

    /// Override the branch tracked by the local mirror
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Override the local dotfiles directory
    #[arg(long, global = true, value_name = "PATH")]
    pub dotfiles_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Provision tools, sync dotfiles, back up and link configuration
    Install(InstallOpts),
    /// Print installed tool versions
    Report,
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::unreachable
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_install() {
        let cli = Cli::parse_from(["setup-env"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.resolved_command(), Command::Install(_)));
    }

    #[test]
    fn parse_install_dry_run_short() {
        let cli = Cli::parse_from(["setup-env", "-d", "install"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_dry_run_without_subcommand() {
        let cli = Cli::parse_from(["setup-env", "--dry-run"]);
        assert!(cli.global.dry_run);
        assert!(matches!(cli.resolved_command(), Command::Install(_)));
    }

    #[test]
    fn parse_install_skip_tasks() {
        let cli = Cli::parse_from(["setup-env", "install", "--skip", "backup,symlinks"]);
        let Command::Install(opts) = cli.resolved_command() else {
            unreachable!("expected Install command");
        };
        assert_eq!(opts.skip, vec!["backup", "symlinks"]);
    }

    #[test]
    fn parse_install_only_tasks() {
        let cli = Cli::parse_from(["setup-env", "install", "--only", "editor"]);
        let Command::Install(opts) = cli.resolved_command() else {
            unreachable!("expected Install command");
        };
        assert_eq!(opts.only, vec!["editor"]);
    }

    #[test]
    fn parse_overrides() {
        let cli = Cli::parse_from([
            "setup-env",
            "--repo",
            "https://example.com/d.git",
            "--branch",
            "dev",
            "--dotfiles-dir",
            "/tmp/dots",
            "--config",
            "/tmp/c.toml",
        ]);
        assert_eq!(cli.global.repo.as_deref(), Some("https://example.com/d.git"));
        assert_eq!(cli.global.branch.as_deref(), Some("dev"));
        assert_eq!(cli.global.dotfiles_dir, Some(PathBuf::from("/tmp/dots")));
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn parse_report() {
        let cli = Cli::parse_from(["setup-env", "report"]);
        assert!(matches!(cli.resolved_command(), Command::Report));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["setup-env", "version"]);
        assert!(matches!(cli.resolved_command(), Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["setup-env", "-v"]);
        assert!(cli.verbose);
    }
}
