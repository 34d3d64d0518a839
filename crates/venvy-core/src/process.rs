use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const MAX_CAPTURE_BYTES: usize = 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub(crate) struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl RunOutput {
    pub(crate) fn success(&self) -> bool {
        self.code == 0 && !self.timed_out
    }

    pub(crate) fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Execute a program with captured stdout/stderr and a hard wall-clock
/// deadline. On deadline the child is killed and `timed_out` is set; partial
/// output captured up to that point is kept. Errors only when the program
/// cannot be spawned or its streams cannot be read.
pub(crate) fn run_with_timeout<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    timeout: Duration,
) -> io::Result<RunOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout pipe missing"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr pipe missing"))?;
    let stdout_handle = thread::spawn(move || read_limited(stdout, MAX_CAPTURE_BYTES));
    let stderr_handle = thread::spawn(move || read_limited(stderr, MAX_CAPTURE_BYTES));

    let deadline = Instant::now() + timeout;
    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            timed_out = true;
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };
    let code = status.and_then(|s| s.code()).unwrap_or(-1);

    let (mut stdout, stdout_truncated) = stdout_handle
        .join()
        .map_err(|_| io::Error::other("stdout reader panicked"))??;
    let (mut stderr, stderr_truncated) = stderr_handle
        .join()
        .map_err(|_| io::Error::other("stderr reader panicked"))??;
    if stdout_truncated {
        stdout.push_str("\n[...truncated...]\n");
    }
    if stderr_truncated {
        stderr.push_str("\n[...truncated...]\n");
    }

    debug!(
        program = %program.display(),
        code,
        timed_out,
        "external tool finished"
    );
    Ok(RunOutput {
        code,
        stdout,
        stderr,
        timed_out,
    })
}

/// Reads a stream to its end, keeping at most `limit` bytes. The stream is
/// always drained so the child never blocks on a full pipe.
fn read_limited(mut stream: impl Read, limit: usize) -> io::Result<(String, bool)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        if buf.len() < limit {
            let take = n.min(limit - buf.len());
            buf.extend_from_slice(&chunk[..take]);
            if take < n {
                truncated = true;
            }
        } else {
            truncated = true;
        }
    }
    Ok((String::from_utf8_lossy(&buf).into_owned(), truncated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(unix)]
    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_exit_code() {
        let output =
            run_with_timeout(&sh(), &["-c", "echo hello; exit 0"], Duration::from_secs(5))
                .expect("spawn");
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_reported_not_an_error() {
        let output = run_with_timeout(
            &sh(),
            &["-c", "echo oops >&2; exit 3"],
            Duration::from_secs(5),
        )
        .expect("spawn");
        assert!(!output.success());
        assert_eq!(output.code, 3);
        assert_eq!(output.stderr.trim(), "oops");
        assert_eq!(output.combined().trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn deadline_kills_the_child() {
        let started = Instant::now();
        let output = run_with_timeout(
            &sh(),
            &["-c", "echo partial; sleep 30"],
            Duration::from_millis(200),
        )
        .expect("spawn");
        assert!(output.timed_out);
        assert!(!output.success());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(output.stdout.trim(), "partial");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let result = run_with_timeout(
            Path::new("/definitely/not/a/program"),
            &["--version"],
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }
}
