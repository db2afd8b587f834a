use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use setup_env::cli::{Cli, Command};
use setup_env::commands;
use setup_env::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match args.resolved_command() {
        Command::Install(opts) => {
            logging::init_subscriber(args.verbose, "install");
            let log = Arc::new(Logger::new("install"));
            commands::install::run(&args.global, &opts, &log)
        }
        Command::Report => {
            logging::init_subscriber(args.verbose, "report");
            let log = Arc::new(Logger::new("report"));
            commands::report::run(&args.global, &log)
        }
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
