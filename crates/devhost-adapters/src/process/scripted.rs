//! Scripted process runner for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use devhost_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandSpec, ProcessRunner},
    },
    error::{DevhostError, DevhostResult},
};

type Handler = Arc<dyn Fn(&CommandSpec) -> DevhostResult<CommandOutput> + Send + Sync>;

/// Fake `ProcessRunner` with a fixed set of installed programs.
///
/// Every invocation is recorded. Programs without a scripted handler exit 0
/// with empty output; programs outside the installed set fail the way a
/// real spawn would. Clones share state.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    installed: Arc<RwLock<HashSet<String>>>,
    handlers: Arc<RwLock<HashMap<String, Handler>>>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark programs as present on PATH.
    pub fn with_programs<I, S>(self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut installed) = self.installed.write() {
            installed.extend(programs.into_iter().map(Into::into));
        }
        self
    }

    /// Script the response for `program`; marks it installed.
    pub fn on(
        self,
        program: impl Into<String>,
        handler: impl Fn(&CommandSpec) -> DevhostResult<CommandOutput> + Send + Sync + 'static,
    ) -> Self {
        let program = program.into();
        if let Ok(mut installed) = self.installed.write() {
            installed.insert(program.clone());
        }
        if let Ok(mut handlers) = self.handlers.write() {
            handlers.insert(program, Arc::new(handler));
        }
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Commands run for `program`.
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|call| call.program == program)
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> DevhostResult<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        if !self.program_exists(&command.program) {
            return Err(ApplicationError::CapabilityUnavailable {
                capability: command.program.clone(),
                reason: "not found on PATH".into(),
            }
            .into());
        }

        let handler = self
            .handlers
            .read()
            .map_err(|_| DevhostError::Internal {
                message: "scripted runner lock poisoned".into(),
            })?
            .get(&command.program)
            .cloned();
        match handler {
            Some(handler) => handler(command),
            None => Ok(CommandOutput::success("")),
        }
    }

    fn program_exists(&self, program: &str) -> bool {
        self.installed
            .read()
            .is_ok_and(|installed| installed.contains(program))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscripted_installed_programs_succeed() {
        let runner = ScriptedRunner::new().with_programs(["nginx"]);
        let out = runner.run(&CommandSpec::new("nginx").arg("-t")).unwrap();
        assert!(out.is_success());
        assert_eq!(runner.calls_to("nginx").len(), 1);
    }

    #[test]
    fn missing_programs_fail_like_a_spawn() {
        let runner = ScriptedRunner::new();
        assert!(runner.run(&CommandSpec::new("mkcert")).is_err());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn handlers_see_the_command() {
        let runner = ScriptedRunner::new().on("mysqladmin", |cmd| {
            Ok(CommandOutput::failure(1, format!("{} unreachable", cmd.args[0])))
        });
        let out = runner
            .run(&CommandSpec::new("mysqladmin").arg("ping"))
            .unwrap();
        assert_eq!(out.stderr, "ping unreachable");
    }
}
