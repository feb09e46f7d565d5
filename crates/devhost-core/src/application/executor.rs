//! Action Executor - the only component that touches the host.
//!
//! Every mutation goes through [`ActionExecutor::execute`]: in a live run the
//! action is performed, in a dry run only its description is journaled and a
//! synthetic [`Execution::Simulated`] comes back. Read-only queries run in
//! both modes so that a dry run makes the same decisions a live run would.
//!
//! Each invocation is appended to an in-memory journal and emitted as a
//! `tracing` event on the `devhost::audit` target, which the CLI routes to
//! the audit log file.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandSpec, Filesystem, PortProbe, ProcessRunner, Prompt},
    },
    domain::{ExecutionMode, FileMode, StepOutcome},
    error::{DevhostError, DevhostResult},
};

/// Target for audit events.
pub const AUDIT_TARGET: &str = "devhost::audit";

/// Result of a mutating action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution<T> {
    Performed(T),
    /// Dry run: nothing happened.
    Simulated,
}

impl<T> Execution<T> {
    pub const fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated)
    }

    pub fn performed(self) -> Option<T> {
        match self {
            Self::Performed(value) => Some(value),
            Self::Simulated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionLevel {
    Debug,
    Info,
    Warn,
}

/// One journal entry.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    pub timestamp: DateTime<Utc>,
    pub level: ActionLevel,
    pub message: String,
    pub simulated: bool,
}

/// Runs or simulates host mutations under a fixed [`ExecutionMode`].
pub struct ActionExecutor {
    mode: ExecutionMode,
    filesystem: Box<dyn Filesystem>,
    runner: Box<dyn ProcessRunner>,
    probe: Box<dyn PortProbe>,
    prompt: Box<dyn Prompt>,
    journal: RwLock<Vec<ActionRecord>>,
    /// Live actions that changed, or may have changed, the host.
    mutations: AtomicUsize,
}

impl ActionExecutor {
    pub fn new(
        mode: ExecutionMode,
        filesystem: Box<dyn Filesystem>,
        runner: Box<dyn ProcessRunner>,
        probe: Box<dyn PortProbe>,
        prompt: Box<dyn Prompt>,
    ) -> Self {
        Self {
            mode,
            filesystem,
            runner,
            probe,
            prompt,
            journal: RwLock::new(Vec::new()),
            mutations: AtomicUsize::new(0),
        }
    }

    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub const fn is_dry_run(&self) -> bool {
        self.mode.is_dry_run()
    }

    /// Outcome for a step that had to change something.
    pub const fn change_outcome(&self) -> StepOutcome {
        if self.mode.is_dry_run() {
            StepOutcome::Simulated
        } else {
            StepOutcome::Committed
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Perform `action`, or in a dry run only record `description`.
    pub fn execute<T>(
        &self,
        description: impl Into<String>,
        action: impl FnOnce() -> DevhostResult<T>,
    ) -> DevhostResult<Execution<T>> {
        let description = description.into();
        if self.mode.is_dry_run() {
            self.record(ActionLevel::Info, &description, true);
            return Ok(Execution::Simulated);
        }

        self.record(ActionLevel::Info, &description, false);
        action()
            .map(|value| {
                self.note_mutation();
                Execution::Performed(value)
            })
            .inspect_err(|e| {
                warn!(target: AUDIT_TARGET, action = %description, error = %e, "action failed");
            })
    }

    /// Live mutations performed so far, counting external programs that
    /// exited non-zero or were killed, since those may have left files behind.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::Relaxed)
    }

    fn note_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_file(&self, path: &Path, content: &str) -> DevhostResult<Execution<()>> {
        self.execute(format!("write {}", path.display()), || {
            self.filesystem.write_file(path, content)
        })
    }

    pub fn write_file_with_mode(
        &self,
        path: &Path,
        content: &str,
        mode: FileMode,
    ) -> DevhostResult<Execution<()>> {
        self.execute(format!("write {} (mode {mode})", path.display()), || {
            self.filesystem.write_file_with_mode(path, content, mode)
        })
    }

    pub fn append_file(&self, path: &Path, content: &str) -> DevhostResult<Execution<()>> {
        self.execute(format!("append to {}", path.display()), || {
            self.filesystem.append_file(path, content)
        })
    }

    pub fn copy_file(&self, from: &Path, to: &Path) -> DevhostResult<Execution<()>> {
        self.execute(
            format!("copy {} to {}", from.display(), to.display()),
            || self.filesystem.copy_file(from, to),
        )
    }

    pub fn remove_file(&self, path: &Path) -> DevhostResult<Execution<()>> {
        self.execute(format!("remove {}", path.display()), || {
            self.filesystem.remove_file(path)
        })
    }

    pub fn remove_dir_all(&self, path: &Path) -> DevhostResult<Execution<()>> {
        self.execute(format!("remove directory {}", path.display()), || {
            self.filesystem.remove_dir_all(path)
        })
    }

    pub fn create_dir_all(&self, path: &Path) -> DevhostResult<Execution<()>> {
        self.execute(format!("create directory {}", path.display()), || {
            self.filesystem.create_dir_all(path)
        })
    }

    pub fn set_mode(&self, path: &Path, mode: FileMode) -> DevhostResult<Execution<()>> {
        self.execute(format!("chmod {mode} {}", path.display()), || {
            self.filesystem.set_mode(path, mode)
        })
    }

    pub fn symlink(&self, target: &Path, link: &Path) -> DevhostResult<Execution<()>> {
        self.execute(
            format!("link {} -> {}", link.display(), target.display()),
            || self.filesystem.symlink(target, link),
        )
    }

    /// Run a program; a non-zero exit is an `ExternalTool` error.
    pub fn run(&self, command: &CommandSpec) -> DevhostResult<Execution<CommandOutput>> {
        self.execute(format!("run {command}"), || {
            let output = self.runner.run(command).inspect_err(|e| {
                if matches!(e, DevhostError::Application(ApplicationError::ToolTimeout { .. })) {
                    self.note_mutation();
                }
            })?;
            if output.is_success() {
                Ok(output)
            } else {
                self.note_mutation();
                Err(tool_failure(command, &output).into())
            }
        })
    }

    // -------------------------------------------------------------------------
    // Queries (run in every mode)
    // -------------------------------------------------------------------------

    pub fn read_to_string(&self, path: &Path) -> DevhostResult<String> {
        self.record(ActionLevel::Debug, &format!("read {}", path.display()), false);
        self.filesystem.read_to_string(path)
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.filesystem.exists(path)
    }

    pub fn list_dir(&self, path: &Path) -> DevhostResult<Vec<PathBuf>> {
        self.filesystem.list_dir(path)
    }

    /// Run a read-only program. The exit status is returned, not judged.
    pub fn query(&self, command: &CommandSpec) -> DevhostResult<CommandOutput> {
        self.record(ActionLevel::Debug, &format!("query {command}"), false);
        self.runner.run(command)
    }

    /// Run a read-only program and fail on non-zero exit.
    pub fn query_ok(&self, command: &CommandSpec) -> DevhostResult<CommandOutput> {
        let output = self.query(command)?;
        if output.is_success() {
            Ok(output)
        } else {
            Err(tool_failure(command, &output).into())
        }
    }

    pub fn program_exists(&self, program: &str) -> bool {
        self.runner.program_exists(program)
    }

    pub fn port_in_use(&self, port: u16) -> bool {
        self.probe.is_in_use(port)
    }

    // -------------------------------------------------------------------------
    // Operator interaction and journal
    // -------------------------------------------------------------------------

    /// True under assume-yes; otherwise true iff the answer is `y`/`Y`.
    pub fn confirm(&self, question: &str) -> DevhostResult<bool> {
        if self.mode.assume_yes() {
            self.record(ActionLevel::Info, &format!("confirm '{question}': yes (assumed)"), false);
            return Ok(true);
        }
        let answer = self.prompt.ask(question)?;
        let accepted = answer.trim().eq_ignore_ascii_case("y");
        self.record(
            ActionLevel::Info,
            &format!("confirm '{question}': {}", if accepted { "yes" } else { "no" }),
            false,
        );
        Ok(accepted)
    }

    /// Journal a non-fatal problem.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.record(ActionLevel::Warn, message.as_ref(), self.is_dry_run());
    }

    /// Snapshot of every action journaled so far.
    pub fn journal(&self) -> Vec<ActionRecord> {
        self.journal
            .read()
            .map(|journal| journal.clone())
            .unwrap_or_default()
    }

    fn record(&self, level: ActionLevel, message: &str, simulated: bool) {
        match level {
            ActionLevel::Debug => debug!(target: AUDIT_TARGET, simulated, "{message}"),
            ActionLevel::Info => info!(target: AUDIT_TARGET, simulated, "{message}"),
            ActionLevel::Warn => warn!(target: AUDIT_TARGET, simulated, "{message}"),
        }
        if let Ok(mut journal) = self.journal.write() {
            journal.push(ActionRecord {
                timestamp: Utc::now(),
                level,
                message: message.to_string(),
                simulated,
            });
        }
    }
}

fn tool_failure(command: &CommandSpec, output: &CommandOutput) -> ApplicationError {
    let stderr = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    ApplicationError::ExternalTool {
        program: command.program.clone(),
        code: output.status,
        stderr: stderr.to_string(),
    }
}

/// Executor over mocks with no expectations; any host access panics.
#[cfg(test)]
pub(crate) fn test_executor(mode: ExecutionMode) -> std::sync::Arc<ActionExecutor> {
    use crate::application::ports::{MockFilesystem, MockPortProbe, MockProcessRunner};

    test_executor_with(
        mode,
        MockFilesystem::new(),
        MockProcessRunner::new(),
        MockPortProbe::new(),
    )
}

#[cfg(test)]
pub(crate) fn test_executor_with(
    mode: ExecutionMode,
    fs: crate::application::ports::MockFilesystem,
    runner: crate::application::ports::MockProcessRunner,
    probe: crate::application::ports::MockPortProbe,
) -> std::sync::Arc<ActionExecutor> {
    std::sync::Arc::new(ActionExecutor::new(
        mode,
        Box::new(fs),
        Box::new(runner),
        Box::new(probe),
        Box::new(crate::application::ports::MockPrompt::new()),
    ))
}
