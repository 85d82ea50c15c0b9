//! Internal utilities.

use crate::error::ToolError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Interval between child exit polls.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Looks up `program` on `PATH`, returning the first executable match.
#[must_use]
pub fn find_program(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        candidate_names(program)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|p| is_executable(p))
    })
}

fn candidate_names(program: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(program).extension().is_none() {
        vec![format!("{program}.exe"), program.to_string()]
    } else {
        vec![program.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Runs `program` with `args` and returns its stdout if it exits
/// successfully within `timeout`.
///
/// Stdout is drained on a helper thread while the child runs, so output
/// larger than the pipe buffer cannot stall it. The child is killed once the
/// deadline passes. Stderr is discarded.
///
/// # Errors
///
/// Returns a [`ToolError`] describing why no output is available.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<String, ToolError> {
    let exe = find_program(program).ok_or_else(|| ToolError::NotInstalled {
        program: program.to_string(),
    })?;
    let spawn_err = |source| ToolError::Spawn {
        program: program.to_string(),
        source,
    };

    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(spawn_err)?;

    let stdout = child.stdout.take();
    let reader = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut raw = Vec::new();
        if let Some(mut out) = stdout {
            out.read_to_end(&mut raw)?;
        }
        Ok(raw)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::TimedOut {
                    program: program.to_string(),
                    secs: timeout.as_secs(),
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(spawn_err(e));
            }
        }
    };

    if !status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status,
        });
    }

    let raw = match reader.join() {
        Ok(res) => res.map_err(spawn_err)?,
        Err(_) => Vec::new(),
    };
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Returns `true` if the current user may write to `path`.
///
/// A missing file is not writable.
#[cfg(unix)]
#[must_use]
pub fn is_writable(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    let Ok(c_path) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

/// Returns `true` if `path` exists and is not marked read-only.
#[cfg(not(unix))]
#[must_use]
pub fn is_writable(path: &Path) -> bool {
    path.metadata().is_ok_and(|m| !m.permissions().readonly())
}
