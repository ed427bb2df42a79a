// Process Execution
// Runs an external command to completion under a wall-clock bound

use crate::runners::command::ToolCommand;

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// How long to keep reading pipes after the child has exited or been killed.
/// Grandchildren that inherited the pipes can hold them open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How the child process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Ran to completion; `None` when terminated by a signal
    Exited(Option<i32>),
    /// Killed after exceeding the bound
    TimedOut(Duration),
    /// Could not be started
    LaunchFailed(String),
}

/// Output collected from one child process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ProcessStatus,
    pub duration: Duration,
}

/// Run `command` with captured output, killing it once `timeout` elapses.
///
/// The child leads its own process group, and a timeout kills the whole
/// group so compilers started by the tool die with it. Output produced
/// before a kill is still returned.
pub async fn run_with_timeout(command: &ToolCommand, timeout: Duration) -> ProcessOutput {
    let start = Instant::now();

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ProcessOutput {
                stdout: String::new(),
                stderr: String::new(),
                status: ProcessStatus::LaunchFailed(format!(
                    "failed to spawn '{}': {}",
                    command.program, e
                )),
                duration: start.elapsed(),
            };
        }
    };

    let stdout_buf = Arc::new(Mutex::new(Vec::new()));
    let stderr_buf = Arc::new(Mutex::new(Vec::new()));
    let stdout_task = child
        .stdout
        .take()
        .map(|pipe| collect(pipe, stdout_buf.clone()));
    let stderr_task = child
        .stderr
        .take()
        .map(|pipe| collect(pipe, stderr_buf.clone()));

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(result) => exit_status(result, &command.program),
        Err(_) => {
            kill_group(&mut child, &command.program).await;
            ProcessStatus::TimedOut(timeout)
        }
    };

    tokio::join!(drain(stdout_task), drain(stderr_task));

    ProcessOutput {
        stdout: take_text(&stdout_buf),
        stderr: take_text(&stderr_buf),
        status,
        duration: start.elapsed(),
    }
}

fn collect<R>(mut pipe: R, sink: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        }
    })
}

fn exit_status(result: io::Result<ExitStatus>, program: &str) -> ProcessStatus {
    match result {
        Ok(exit) => ProcessStatus::Exited(exit.code()),
        Err(e) => {
            tracing::warn!(program, error = %e, "failed to wait for child");
            ProcessStatus::LaunchFailed(format!("lost track of '{}' while waiting: {}", program, e))
        }
    }
}

async fn kill_group(child: &mut Child, program: &str) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                tracing::warn!(program, error = %e, "failed to kill process group");
            }
        }
    }

    // Reaps the leader; on non-unix hosts this is the only kill
    if let Err(e) = child.kill().await {
        tracing::warn!(program, error = %e, "failed to kill timed out child");
    }
}

async fn drain(task: Option<JoinHandle<()>>) {
    let Some(mut task) = task else {
        return;
    };
    if tokio::time::timeout(DRAIN_GRACE, &mut task).await.is_err() {
        task.abort();
    }
}

fn take_text(buf: &Mutex<Vec<u8>>) -> String {
    match buf.lock() {
        Ok(mut bytes) => String::from_utf8_lossy(&std::mem::take(&mut *bytes)).into_owned(),
        Err(_) => String::new(),
    }
}
