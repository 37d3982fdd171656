//! Subprocess execution with piped standard streams.
//!
//! This module has no knowledge of solc. It runs an argument vector, writes a
//! byte buffer to the child's stdin, and drains stdout and stderr on separate
//! threads while the input is still being written. A child that produces
//! output before it has consumed all of its input therefore cannot deadlock
//! the caller on a full pipe.
//!
//! With a timeout the child runs in its own process group (on Unix) and the
//! whole group is killed on expiry. The pump threads are detached, so a
//! descendant that escaped the group and still holds a pipe open delays the
//! caller by at most [`DRAIN_GRACE`].

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::command::CompilerInvocation;
use crate::error::{describe_error_chain, ToolchainError, ToolchainResult};

/// How often a child with a timeout is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long output pipes are still drained after a timeout kill.
pub const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// How the child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Exited normally with this code.
    Exited(i32),
    /// Terminated by a signal.
    Terminated,
    /// Killed after exceeding the timeout.
    TimedOut { timeout: Duration },
    /// Started, but its exit status could not be collected.
    WaitFailed,
    /// Never started.
    LaunchFailed,
}

/// Captured outcome of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: RunStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Synthetic outcome for a process that could not be started.
    pub fn launch_failure(diagnostic: impl Into<String>) -> Self {
        Self {
            status: RunStatus::LaunchFailed,
            stdout: String::new(),
            stderr: diagnostic.into(),
        }
    }

    /// Returns true if the child exited with status 0.
    pub fn success(&self) -> bool {
        self.status == RunStatus::Exited(0)
    }
}

/// Runs `invocation`, converting launch failures into a failed outcome.
///
/// The diagnostic for a launch failure names the program and lists every
/// error in the cause chain.
pub fn run_process(
    invocation: &CompilerInvocation,
    env: &[(OsString, OsString)],
    input: &[u8],
    timeout: Option<Duration>,
) -> ProcessOutput {
    match try_run_process(invocation, env, input, timeout) {
        Ok(output) => output,
        Err(err) => {
            warn!(
                program = %invocation.program().to_string_lossy(),
                error = %err,
                "failed to launch toolchain"
            );
            ProcessOutput::launch_failure(format!(
                "failed to launch `{}`: {}",
                invocation.program().to_string_lossy(),
                describe_error_chain(&err)
            ))
        }
    }
}

/// Runs `invocation`, returning an error if the child cannot be started.
///
/// `env` is added on top of the inherited environment. With a `timeout`,
/// the child is killed once it elapses; whatever output was drained up to
/// that point is kept and a cancellation notice is appended to stderr.
/// Once the child has started every outcome, including a failure to collect
/// its exit status, is reported through [`ProcessOutput`].
pub fn try_run_process(
    invocation: &CompilerInvocation,
    env: &[(OsString, OsString)],
    input: &[u8],
    timeout: Option<Duration>,
) -> ToolchainResult<ProcessOutput> {
    let mut cmd = Command::new(invocation.program());
    cmd.args(invocation.arguments())
        .envs(env.iter().map(|(key, value)| (key, value)))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = invocation.working_dir() {
        cmd.current_dir(dir);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        if timeout.is_some() {
            cmd.process_group(0);
        }
    }

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(ToolchainError::SpawnFailed)?;

    spawn_feeder(child.stdin.take(), input.to_vec());
    let stdout = Pump::spawn(child.stdout.take());
    let stderr = Pump::spawn(child.stderr.take());

    let waited = wait_for_exit(&mut child, timeout);
    let grace = Instant::now() + DRAIN_GRACE;
    let drain_deadline = match waited {
        Waited::Exited(_) => timeout.map(|t| (start + t).max(grace)),
        Waited::TimedOut(_) | Waited::Failed(_) => Some(grace),
    };
    let stdout = stdout.finish(drain_deadline);
    let stderr = stderr.finish(drain_deadline);

    Ok(finish_output(waited, &stdout, &stderr))
}

enum Waited {
    Exited(ExitStatus),
    TimedOut(Duration),
    Failed(io::Error),
}

fn wait_for_exit(child: &mut Child, timeout: Option<Duration>) -> Waited {
    let Some(timeout) = timeout else {
        return match child.wait() {
            Ok(status) => Waited::Exited(status),
            Err(e) => Waited::Failed(e),
        };
    };

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Waited::Exited(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    kill_group(child);
                    return Waited::TimedOut(timeout);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_group(child);
                return Waited::Failed(e);
            }
        }
    }
}

/// Kills the child and, on Unix, every process left in its group.
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: killpg takes no pointers; the group was created at
            // spawn and the leader is not reaped yet, so the id is ours.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn finish_output(waited: Waited, stdout: &[u8], stderr: &[u8]) -> ProcessOutput {
    let mut output = ProcessOutput {
        status: RunStatus::LaunchFailed,
        stdout: String::from_utf8_lossy(stdout).into_owned(),
        stderr: String::from_utf8_lossy(stderr).into_owned(),
    };

    match waited {
        Waited::Exited(status) => output.status = exit_status(status),
        Waited::TimedOut(timeout) => {
            append_line(
                &mut output.stderr,
                &format!("toolchain execution cancelled after {:?}", timeout),
            );
            output.status = RunStatus::TimedOut { timeout };
        }
        Waited::Failed(e) => {
            warn!(error = %e, "failed to wait for toolchain");
            append_line(&mut output.stderr, &format!("failed to wait for toolchain: {}", e));
            output.status = RunStatus::WaitFailed;
        }
    }

    output
}

fn append_line(text: &mut String, line: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text.push('\n');
}

fn exit_status(status: ExitStatus) -> RunStatus {
    status.code().map_or(RunStatus::Terminated, RunStatus::Exited)
}

/// Writes all of `input` on a detached thread and closes the pipe.
fn spawn_feeder(stdin: Option<ChildStdin>, input: Vec<u8>) {
    let Some(mut stdin) = stdin else {
        return;
    };
    thread::spawn(move || match stdin.write_all(&input) {
        // The child is free to exit without reading everything.
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            debug!(error = %e, "failed to write toolchain stdin");
        }
        _ => {}
    });
}

/// A detached reader that accumulates one pipe into a shared buffer.
struct Pump {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Pump {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        if let Some(mut pipe) = pipe {
            let sink = Arc::clone(&buf);
            thread::spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            debug!(error = %e, "failed to drain toolchain output");
                            break;
                        }
                    }
                }
                let _ = tx.send(());
            });
        }
        // Without a pipe the sender is dropped here and `finish` returns at once.
        Self { buf, done }
    }

    /// Waits for EOF until `deadline`, then takes whatever has arrived.
    fn finish(self, deadline: Option<Instant>) -> Vec<u8> {
        let at_eof = match deadline {
            None => self.done.recv().is_ok(),
            Some(deadline) => self
                .done
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .is_ok(),
        };
        if !at_eof {
            debug!("toolchain output pipe still open, keeping partial output");
        }
        std::mem::take(&mut *lock(&self.buf))
    }
}

fn lock(buf: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
