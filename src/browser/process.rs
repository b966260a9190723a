//! Renderer process invocation.
//!
//! One render spawns exactly one process:
//! `<command> [extra args…] <driver-script> <page-uri>`. stdin is closed,
//! stdout and stderr are drained by their own tasks while the process is
//! awaited, and the whole run is bounded by `process_timeout`.

use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::driver::DriverScript;
use crate::page::Page;
use crate::{PhandomError, Result};

/// Renderer binary used when nothing else is configured.
pub const DEFAULT_RENDERER: &str = "phantomjs";

/// Default timeout for the entire renderer process.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(45);

/// Default timeout for the `--version` availability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration options for renderer runs.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// The renderer command (default: "phantomjs").
    pub command: String,
    /// Arguments placed before the driver script path.
    pub extra_args: Vec<String>,
    /// Script the renderer executes.
    pub driver: DriverScript,
    /// Timeout for the entire renderer process.
    pub process_timeout: Duration,
    /// Timeout for the availability probe.
    pub probe_timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            command: DEFAULT_RENDERER.to_string(),
            extra_args: Vec::new(),
            driver: DriverScript::default(),
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Everything a finished renderer process left behind.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was ended by a signal.
    pub code: Option<i32>,
    pub elapsed: Duration,
}

impl RenderOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs the renderer against pages.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders `page` and captures the process output.
    ///
    /// The exit code is reported, not judged; callers decide what a
    /// non-zero exit means. `process_timeout` bounds the whole run, including
    /// draining output that descendants of the renderer may still hold open.
    /// On unix the renderer leads its own process group, and the group is
    /// killed on timeout or when the returned future is dropped.
    pub async fn render(&self, page: &Page) -> Result<RenderOutput> {
        let script = self.options.driver.materialize()?;
        let resolved = page.resolve()?;

        let mut cmd = Command::new(&self.options.command);
        cmd.args(&self.options.extra_args)
            .arg(script.path())
            .arg(resolved.uri().as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        debug!(
            command = %self.options.command,
            script = %script.path().display(),
            uri = %resolved.uri(),
            "starting renderer"
        );
        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|err| PhandomError::spawn(&self.options.command, err))?;
        let mut group = GroupGuard::new(child.id());

        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());
        let stdout_abort = stdout_task.abort_handle();
        let stderr_abort = stderr_task.abort_handle();

        let finished = timeout(self.options.process_timeout, async {
            let status = child.wait().await?;
            let stdout = collect(stdout_task).await?;
            let stderr = collect(stderr_task).await?;
            Ok::<_, io::Error>((status, stdout, stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(Ok(done)) => {
                group.disarm();
                done
            }
            Ok(Err(err)) => return Err(PhandomError::Io(err)),
            Err(_) => {
                group.kill();
                let _ = child.kill().await;
                stdout_abort.abort();
                stderr_abort.abort();
                warn!(
                    command = %self.options.command,
                    uri = %resolved.uri(),
                    "renderer killed after exceeding {:?}",
                    self.options.process_timeout
                );
                return Err(PhandomError::Timeout(self.options.process_timeout));
            }
        };

        let output = RenderOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            code: status.code(),
            elapsed: start.elapsed(),
        };

        debug!(
            code = ?output.code,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "renderer finished"
        );
        debug!("STDERR:\n{}", output.stderr);
        debug!("DOM:\n{}", output.stdout);
        Ok(output)
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn collect(task: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    task.await.map_err(io::Error::other)?
}

/// Kills the renderer's process group on drop unless disarmed.
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(err) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        debug!(pgid, error = %err, "renderer process group already gone");
    }
}

// Elsewhere only the direct child is killed, through `kill_on_drop`.
#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}
