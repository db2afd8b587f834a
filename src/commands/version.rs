//! Command: print version information.

/// The build's version: `git describe` output when available, else the
/// crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("SETUP_ENV_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the setup-env version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("setup-env {}", version());
}
