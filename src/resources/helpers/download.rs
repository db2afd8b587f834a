//! Fetch a URL to a local file with whichever of curl or wget is present.
use anyhow::{Context as _, Result, bail};
use std::path::Path;

use crate::error::InstallError;
use crate::exec::Executor;

/// Seconds allowed to establish a connection.
const CONNECT_TIMEOUT: &str = "15";

/// Seconds allowed for the whole transfer.
const TRANSFER_TIMEOUT: &str = "300";

/// Download `url` to `dest`, preferring curl over wget.
///
/// # Errors
///
/// Returns [`InstallError::NoDownloader`] if neither tool is on `PATH`, or an
/// error if the transfer fails.
pub fn download(executor: &dyn Executor, url: &str, dest: &Path) -> Result<()> {
    let dest_str = dest.to_str().context("download path is not valid UTF-8")?;

    let result = if executor.which("curl") {
        executor.run_unchecked(
            "curl",
            &[
                "-fsSL",
                "--connect-timeout",
                CONNECT_TIMEOUT,
                "--max-time",
                TRANSFER_TIMEOUT,
                "-o",
                dest_str,
                url,
            ],
        )?
    } else if executor.which("wget") {
        executor.run_unchecked(
            "wget",
            &[
                "-qO",
                dest_str,
                &format!("--connect-timeout={CONNECT_TIMEOUT}"),
                &format!("--timeout={TRANSFER_TIMEOUT}"),
                url,
            ],
        )?
    } else {
        return Err(InstallError::NoDownloader(url.to_string()).into());
    };

    if !result.success {
        bail!("download failed: {url}: {}", result.stderr.trim());
    }
    Ok(())
}
