//! Best-effort self-update check, run once at startup.
//!
//! Nothing here may prevent the wallpaper from starting: every failure is
//! logged as a single line and swallowed. The blocking HTTP client carries a
//! 10 second timeout and runs on a blocking-friendly thread; cancellation
//! races the wait so control returns promptly either way.

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;

use crate::cancel::CancelToken;

const VERSION_URL: &str = "https://raw.githubusercontent.com/gifpaper/gifpaper/master/version.txt";
const INSTALLER_URL: &str =
    "https://github.com/gifpaper/gifpaper/releases/latest/download/gifpaper-installer.run";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, PartialEq, Error)]
pub enum UpdateError {
    #[error("update check failed: {0}")]
    Network(String),
    #[error("cannot parse remote version \"{0}\"")]
    Parse(String),
    #[error("cannot launch installer: {0}")]
    Install(String),
}

/// Outcome of the startup check.
#[derive(Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Running build is current (or newer).
    UpToDate,
    /// A newer build exists and its installer has been launched; the caller
    /// must exit so the binary can be replaced.
    InstallerLaunched,
    /// The check failed or was cancelled; startup proceeds.
    Skipped,
}

/// Checks the remote version endpoint and, when a strictly newer build is
/// published, downloads and launches its installer with elevated privileges.
pub async fn check_for_updates(cache_dir: PathBuf, cancel: CancelToken) -> UpdateOutcome {
    let outcome = smol::future::race(
        async { Some(smol::unblock(move || check_and_install(&cache_dir)).await) },
        async {
            cancel.wait().await;
            None
        },
    )
    .await;

    match outcome {
        Some(Ok(outcome)) => outcome,
        Some(Err(err)) => {
            log::warn!("{err}");
            UpdateOutcome::Skipped
        }
        None => {
            log::info!("update check cancelled");
            UpdateOutcome::Skipped
        }
    }
}

fn check_and_install(cache_dir: &Path) -> Result<UpdateOutcome, UpdateError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("gifpaper/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| UpdateError::Network(err.to_string()))?;

    let remote = client
        .get(VERSION_URL)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::text)
        .map_err(|err| UpdateError::Network(err.to_string()))?;
    let remote = remote.trim();
    if parse_version(remote).is_none() {
        return Err(UpdateError::Parse(remote.to_string()));
    }

    let current = env!("CARGO_PKG_VERSION");
    if !is_newer(remote, current) {
        log::info!("running the latest version ({current})");
        return Ok(UpdateOutcome::UpToDate);
    }

    log::info!("new version {remote} available, downloading installer");
    let installer = download_installer(&client, cache_dir)?;
    launch_installer(&installer)?;
    Ok(UpdateOutcome::InstallerLaunched)
}

fn download_installer(
    client: &reqwest::blocking::Client,
    cache_dir: &Path,
) -> Result<PathBuf, UpdateError> {
    let bytes = client
        .get(INSTALLER_URL)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::bytes)
        .map_err(|err| UpdateError::Network(err.to_string()))?;

    let path = cache_dir.join("gifpaper-installer.run");
    let mut file =
        std::fs::File::create(&path).map_err(|err| UpdateError::Install(err.to_string()))?;
    file.write_all(&bytes)
        .map_err(|err| UpdateError::Install(err.to_string()))?;
    file.set_permissions(std::fs::Permissions::from_mode(0o755))
        .map_err(|err| UpdateError::Install(err.to_string()))?;
    Ok(path)
}

/// Launches the installer elevated. The caller exits afterwards so the
/// installer can replace the running binary.
fn launch_installer(path: &Path) -> Result<(), UpdateError> {
    Command::new("pkexec")
        .arg(path)
        .spawn()
        .map_err(|err| UpdateError::Install(err.to_string()))?;
    Ok(())
}

/// Splits a version string into numeric segments. A leading `v`/`V` is
/// tolerated; anything else non-numeric rejects the string.
fn parse_version(text: &str) -> Option<Vec<u64>> {
    let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
    if text.is_empty() {
        return None;
    }
    text.split('.')
        .map(|segment| segment.parse::<u64>().ok())
        .collect()
}

/// Semantic ordering: segment-wise numeric compare, missing segments count
/// as zero. Only a strictly newer remote triggers an update. Unparseable
/// input never triggers.
fn is_newer(remote: &str, current: &str) -> bool {
    let (Some(remote), Some(current)) = (parse_version(remote), parse_version(current)) else {
        return false;
    };
    let len = remote.len().max(current.len());
    for i in 0..len {
        let r = remote.get(i).copied().unwrap_or(0);
        let c = current.get(i).copied().unwrap_or(0);
        if r != c {
            return r > c;
        }
    }
    false
}
