//! Availability checks for the renderer binary.

use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version pattern is valid"));

/// Extracts a `MAJOR.MINOR.PATCH` version from `--version` output.
pub fn parse_version(stdout: &str) -> Option<&str> {
    let trimmed = stdout.trim();
    VERSION_RE.is_match(trimmed).then_some(trimmed)
}

/// Runs `<command> --version` and returns the reported version.
///
/// Never fails: a missing binary, a hung process or unexpected output all
/// yield `None`.
pub async fn version(command: &str, probe_timeout: Duration) -> Option<String> {
    let mut cmd = Command::new(command);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(probe_timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            debug!(command, error = %err, "renderer probe could not start");
            return None;
        }
        Err(_) => {
            debug!(command, "renderer probe timed out after {:?}", probe_timeout);
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_version(&stdout).map(str::to_string);
    if version.is_none() {
        debug!(command, output = %stdout.trim(), "renderer probe output is not a version");
    }
    version
}

/// Whether `<command> --version` answers with a version number.
pub async fn is_available(command: &str, probe_timeout: Duration) -> bool {
    version(command, probe_timeout).await.is_some()
}
