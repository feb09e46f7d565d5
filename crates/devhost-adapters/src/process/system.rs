//! Process runner backed by `tokio::process` with a hard deadline.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use devhost_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandSpec, ProcessRunner},
    },
    error::{DevhostError, DevhostResult},
};

/// Default deadline for external tools; generators like `composer` are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Production `ProcessRunner`.
///
/// Each call drives a current-thread tokio runtime. The child races the
/// deadline in `select!`; on expiry it is killed before `ToolTimeout` is
/// returned. `kill_on_drop` covers every other early exit.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    timeout: Duration,
}

impl SystemProcessRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn spawn(&self, command: &CommandSpec) -> DevhostResult<tokio::process::Child> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(if command.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.env {
            cmd.env(key, value.expose());
        }

        cmd.spawn().map_err(|e| spawn_error(&command.program, e))
    }

    async fn run_async(&self, command: &CommandSpec) -> DevhostResult<CommandOutput> {
        let mut child = self.spawn(command)?;

        let stdin_handle = child.stdin.take();
        let input = command.stdin.as_ref().map(|s| s.expose().as_bytes().to_vec());
        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (_, status, stdout, stderr) = tokio::join!(
                    async {
                        // Dropping the handle closes the pipe so the child sees EOF.
                        if let (Some(mut stdin), Some(input)) = (stdin_handle, input) {
                            if let Err(e) = stdin.write_all(&input).await {
                                warn!(error = %e, "failed to write child stdin");
                            }
                        }
                    },
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                status
                    .map(|status| CommandOutput {
                        status: status.code(),
                        stdout: String::from_utf8_lossy(&stdout).into_owned(),
                        stderr: String::from_utf8_lossy(&stderr).into_owned(),
                    })
                    .map_err(|e| DevhostError::Internal {
                        message: format!("waiting for {}: {e}", command.program),
                    })
            } => result,
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                warn!(timeout = ?self.timeout, "child killed after deadline");
                Err(DevhostError::from(ApplicationError::ToolTimeout {
                    program: command.program.clone(),
                    timeout: self.timeout,
                }))
            }
        }
    }
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip_all, fields(program = %command.program))]
    fn run(&self, command: &CommandSpec) -> DevhostResult<CommandOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DevhostError::Internal {
                message: format!("cannot start process runtime: {e}"),
            })?;
        let output = runtime.block_on(self.run_async(command))?;
        debug!(status = ?output.status, "child exited");
        Ok(output)
    }

    fn program_exists(&self, program: &str) -> bool {
        find_in_path(program).is_some()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Resolve `program` against `PATH`, like `which`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

fn spawn_error(program: &str, e: io::Error) -> DevhostError {
    if e.kind() == io::ErrorKind::NotFound {
        ApplicationError::CapabilityUnavailable {
            capability: program.to_string(),
            reason: "not found on PATH".into(),
        }
        .into()
    } else {
        DevhostError::Internal {
            message: format!("failed to spawn {program}: {e}"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use devhost_core::domain::Secret;
    use std::time::Instant;

    #[test]
    fn captures_stdout_and_status() {
        let runner = SystemProcessRunner::default();
        let out = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo hi; exit 3"]))
            .unwrap();
        assert_eq!(out.status, Some(3));
        assert_eq!(out.stdout.trim(), "hi");
    }

    #[test]
    fn pipes_stdin_to_the_child() {
        let runner = SystemProcessRunner::default();
        let out = runner
            .run(&CommandSpec::new("cat").stdin(Secret::new("CREATE DATABASE x;")))
            .unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout, "CREATE DATABASE x;");
    }

    #[test]
    fn kills_the_child_at_the_deadline() {
        let runner = SystemProcessRunner::new(Duration::from_millis(200));
        let started = Instant::now();
        let err = runner
            .run(&CommandSpec::new("sleep").arg("5"))
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(matches!(
            err,
            DevhostError::Application(ApplicationError::ToolTimeout { .. })
        ));
    }

    #[test]
    fn missing_program_is_a_capability_error() {
        let runner = SystemProcessRunner::default();
        let err = runner
            .run(&CommandSpec::new("devhost-definitely-not-installed"))
            .unwrap_err();
        assert!(matches!(
            err,
            DevhostError::Application(ApplicationError::CapabilityUnavailable { .. })
        ));
        assert!(!runner.program_exists("devhost-definitely-not-installed"));
        assert!(runner.program_exists("sh"));
    }
}
