//! Environment bootstrap engine.
//!
//! Provisions a fresh machine for one user: installs the editor, terminal
//! multiplexer, shell and auxiliary tools through whichever package manager
//! is present (with archive and source-build fallbacks for the editor),
//! clones or fast-forwards the dotfiles repository, backs up existing
//! configuration, links configuration into `$HOME`, and reports what is
//! installed.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: built-in defaults with an optional TOML overlay
//! - **[`resources`]**: idempotent `check + apply` primitives (packages, symlinks, login shell)
//! - **[`tasks`]**: named, dependency-ordered units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `report`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod privilege;
pub mod resources;
pub mod tasks;
