//! Implementation of the `devhost doctor` command.
//!
//! Read-only: every probe goes through the executor's query side, so the
//! command is safe to run at any time.

use serde::Serialize;

use devhost_adapters::certs;
use devhost_core::{
    application::ActionExecutor,
    domain::{ExecutionMode, capabilities::STACK_REGISTRY},
};

use crate::{
    cli::global::GlobalArgs, config::AppConfig, context, error::CliResult, output::OutputManager,
};

/// Database engines and the client each one drives.
const DATABASE_CLIENTS: &[(&str, &str)] = &[("mysql", "mysql"), ("mongo", "mongosh")];

#[derive(Debug, Serialize)]
struct Check {
    group: &'static str,
    name: String,
    ok: bool,
    detail: String,
}

impl Check {
    fn new(group: &'static str, name: impl Into<String>, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            group,
            name: name.into(),
            ok,
            detail: detail.into(),
        }
    }
}

pub fn execute(global: GlobalArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // Doctor never mutates the host.
    let mode = ExecutionMode::new(true, global.yes);
    let executor = context::executor(&config, mode);
    let checks = run_checks(&executor, &config);

    if output.is_json() {
        output.json(&checks)?;
        return Ok(());
    }

    let mut group = "";
    for check in &checks {
        if check.group != group {
            group = check.group;
            output.header(group)?;
        }
        let line = format!("{:<14} {}", check.name, check.detail);
        if check.ok {
            output.success(&line)?;
        } else {
            output.warning(&line)?;
        }
    }

    let failing = checks.iter().filter(|c| !c.ok).count();
    output.print("")?;
    if failing == 0 {
        output.success("Everything devhost drives is available")?;
    } else {
        output.info(&format!(
            "{failing} check(s) need attention; `devhost setup` installs the missing pieces"
        ))?;
    }
    Ok(())
}

fn run_checks(exec: &ActionExecutor, config: &AppConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    for engine in context::web_engines(config) {
        let available = engine.is_available(exec);
        checks.push(Check::new(
            "Web servers",
            engine.kind().as_str(),
            available,
            if available {
                format!("sites in {}", engine.sites_available().display())
            } else {
                "not installed".into()
            },
        ));
    }

    let issuers = certs::default_issuers();
    let any_issuer = issuers.iter().any(|issuer| issuer.is_available(exec));
    for issuer in &issuers {
        let available = issuer.is_available(exec);
        checks.push(Check::new(
            "Certificates",
            issuer.name(),
            available || any_issuer,
            if available { "available" } else { "not installed" },
        ));
    }

    for (engine, client) in DATABASE_CLIENTS {
        let available = exec.program_exists(client);
        checks.push(Check::new(
            "Databases",
            *engine,
            available,
            if available {
                format!("{client} found")
            } else {
                format!("{client} not installed")
            },
        ));
    }
    checks.push(Check::new("Databases", "sqlite", true, "no client needed"));

    for stack in STACK_REGISTRY {
        let missing: Vec<&str> = stack
            .required_programs
            .iter()
            .copied()
            .filter(|program| !exec.program_exists(program))
            .collect();
        checks.push(Check::new(
            "Stacks",
            stack.tag.as_str(),
            missing.is_empty(),
            if missing.is_empty() {
                stack.description.to_string()
            } else {
                format!("missing {}", missing.join(", "))
            },
        ));
    }

    checks.push(Check::new(
        "Tools",
        "git",
        exec.program_exists("git"),
        "needed by `devhost publish`",
    ));

    let hosts = &config.paths.hosts_file;
    let readable = exec.read_to_string(hosts).is_ok();
    checks.push(Check::new(
        "Host",
        "hosts file",
        readable,
        if readable {
            hosts.display().to_string()
        } else {
            format!("cannot read {}", hosts.display())
        },
    ));
    let state = &config.paths.state_dir;
    checks.push(Check::new(
        "Host",
        "state dir",
        true,
        if exec.exists(state) {
            state.display().to_string()
        } else {
            format!("{} (created on first run)", state.display())
        },
    ));

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhost_adapters::{FixedPortProbe, MemoryFilesystem, ScriptedPrompt, ScriptedRunner};

    fn executor(fs: MemoryFilesystem, runner: ScriptedRunner) -> ActionExecutor {
        ActionExecutor::new(
            ExecutionMode::dry_run(),
            Box::new(fs),
            Box::new(runner),
            Box::new(FixedPortProbe::new()),
            Box::new(ScriptedPrompt::default()),
        )
    }

    fn check<'a>(checks: &'a [Check], name: &str) -> &'a Check {
        checks.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn reports_installed_and_missing_programs() {
        let fs = MemoryFilesystem::new().with_file("/etc/hosts", "127.0.0.1 localhost\n");
        let runner = ScriptedRunner::new().with_programs(["nginx", "openssl", "npm", "node"]);
        let checks = run_checks(&executor(fs, runner), &AppConfig::default());

        assert!(check(&checks, "nginx").ok);
        assert!(!check(&checks, "apache").ok);
        assert!(check(&checks, "node-spa").ok);
        assert!(!check(&checks, "framework-php").ok);
        assert!(check(&checks, "framework-php").detail.contains("composer"));
        assert!(check(&checks, "hosts file").ok);
        assert!(!check(&checks, "mysql").ok);
    }

    #[test]
    fn one_certificate_tool_is_enough() {
        let fs = MemoryFilesystem::new();
        let runner = ScriptedRunner::new().with_programs(["openssl"]);
        let checks = run_checks(&executor(fs, runner), &AppConfig::default());
        assert!(check(&checks, "mkcert").ok);
        assert!(check(&checks, "openssl").ok);
        assert!(!check(&checks, "hosts file").ok);
    }
}
