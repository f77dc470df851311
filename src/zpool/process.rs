//! Bounded execution of external programs
//!
//! Every external facility (`zpool`, `sendmail`, `hostname`) is run
//! through [`run`], which enforces a timeout and kills the child when it
//! expires.

use crate::error::CommandError;

use std::io::{Read, Write};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `program` with `args`, optionally feeding `stdin`, and return stdout.
///
/// Non-zero exit statuses are reported as [`CommandError::Failed`] with the
/// captured stderr. The deadline covers both the program's exit and the
/// end of its output: a background descendant that keeps stdout or stderr
/// open past `timeout` counts as a timeout too. On timeout the program's
/// whole process group is killed and [`CommandError::Timeout`] is returned.
pub fn run(
    program: &Path,
    args: &[&str],
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<String, CommandError> {
    let description = describe(program, args);
    log::debug!("Running {}", description);

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Own process group, so a timeout reaches everything the program forked
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|e| CommandError::SpawnFailed {
        command: description.clone(),
        message: e.to_string(),
    })?;
    let deadline = Instant::now() + timeout;

    // Pipes are fed and drained on detached threads; nothing below waits
    // on them past the deadline.
    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        let input = input.to_vec();
        let name = description.clone();
        thread::spawn(move || {
            if let Err(e) = pipe.write_all(&input) {
                log::debug!("Writing stdin to {} failed: {}", name, e);
            }
        });
    }
    let stdout_rx = child.stdout.take().map(drain);
    let stderr_rx = child.stderr.take().map(drain);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                return Err(timed_out(&mut child, description, timeout))
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_group(&mut child);
                return Err(CommandError::SpawnFailed {
                    command: description,
                    message: e.to_string(),
                });
            }
        }
    };

    let (stdout, stderr) = match (collect(stdout_rx, deadline), collect(stderr_rx, deadline)) {
        (Ok(stdout), Ok(stderr)) => (stdout, stderr),
        _ => {
            log::debug!("{} exited but its output is still held open", description);
            return Err(timed_out(&mut child, description, timeout));
        }
    };

    if !status.success() {
        return Err(CommandError::Failed {
            command: description,
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(stdout)
}

fn describe(program: &Path, args: &[&str]) -> String {
    let mut description = program.display().to_string();
    for arg in args {
        description.push(' ');
        description.push_str(arg);
    }
    description
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Wait for a drained pipe until `deadline`
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Result<String, RecvTimeoutError> {
    let Some(rx) = rx else {
        return Ok(String::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        Err(e) => Err(e),
    }
}

fn timed_out(child: &mut Child, command: String, timeout: Duration) -> CommandError {
    kill_group(child);
    CommandError::Timeout {
        command,
        seconds: timeout.as_secs(),
    }
}

/// Kill the child together with its process group, then reap it
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // Safety: kill(2) only sends a signal. The negative pid addresses
            // the group created at spawn, whose id is the child's pid.
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
