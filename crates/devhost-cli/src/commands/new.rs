//! Implementation of the `devhost new` command.
//!
//! Responsibility: translate CLI arguments into a `ProjectRequest`, run the
//! orchestrator, and display the report. No provisioning logic lives here.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use devhost_core::{
    application::{ActionRecord, ProvisionReport, ProvisionStatus},
    domain::{BackendSelection, ProjectRequest, Step, StepOutcome, WebServerKind},
    error::DevhostError,
};

use crate::{
    cli::{NewArgs, global::GlobalArgs},
    config::AppConfig,
    context,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Execute the `devhost new` command.
///
/// 1. Build and validate the request
/// 2. Provision through the orchestrator
/// 3. Print the step report
/// 4. Map the run status to an error (and so an exit code)
#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let root = resolve_root(args.root.as_deref(), &config.paths.projects_root)?;
    let request = build_request(&args, root)?;
    debug!(%request, project_dir = %request.project_dir().display(), "request built");

    let executor = context::executor(&config, global.execution_mode());
    let orchestrator = context::orchestrator(&config, executor);

    let spinner = output.spinner(&format!("Provisioning {}", request.name()));
    let report = orchestrator.provision(&request);
    spinner.finish_and_clear();

    if output.is_json() {
        output.json(&report)?;
    } else {
        render(&report, &output)?;
        if report.dry_run {
            render_plan(&orchestrator.executor().journal(), &output)?;
        }
    }

    outcome(report)
}

fn build_request(args: &NewArgs, root: PathBuf) -> CliResult<ProjectRequest> {
    let backends = if args.servers.is_empty() {
        BackendSelection::Auto
    } else {
        BackendSelection::Explicit(args.servers.iter().copied().map(WebServerKind::from).collect())
    };

    ProjectRequest::builder(args.name.as_str())
        .stack(args.stack)
        .root(root)
        .port(args.port)
        .domain(args.domain.clone())
        .tls(args.tls)
        .database(args.database.map(Into::into))
        .backends(backends)
        .build()
        .map_err(|e| CliError::Core(e.into()))
}

/// `--root`, else the configured projects root; relative paths are taken
/// from the current directory.
pub fn resolve_root(flag: Option<&Path>, configured: &Path) -> CliResult<PathBuf> {
    let root = flag.unwrap_or(configured);
    if root.is_absolute() {
        return Ok(root.to_path_buf());
    }
    let cwd = std::env::current_dir().with_cli_context(|| "reading the current directory")?;
    Ok(cwd.join(root))
}

fn render(report: &ProvisionReport, output: &OutputManager) -> CliResult<()> {
    let title = if report.dry_run {
        format!("Plan for {} (dry run, nothing was changed)", report.project)
    } else {
        format!("Provisioned {}", report.project)
    };
    output.header(&title)?;
    for record in &report.steps {
        output.step(record)?;
    }
    if let Some(failure) = &report.failure {
        output.error(&format!("stopped at the {} step", failure.step))?;
    }
    output.print("")?;

    let scheme = match report.outcome_of(Step::Tls) {
        Some(StepOutcome::Committed | StepOutcome::AlreadyPresent | StepOutcome::Simulated) => {
            "https"
        }
        _ => "http",
    };
    output.field("url", &format!("{scheme}://{}", report.domain))?;
    output.field("project", &report.project_path.display().to_string())?;
    if let Some(root) = &report.document_root {
        output.field("docroot", &root.display().to_string())?;
    }
    if let Some(port) = report.port {
        output.field("port", &port.to_string())?;
    }
    if let Some(db) = &report.database {
        output.field("database", &format!("{} ({})", db.database, db.engine))?;
        output.field("connect", &db.connection)?;
        output.field("secrets", &db.sidecar.display().to_string())?;
    }
    Ok(())
}

fn render_plan(journal: &[ActionRecord], output: &OutputManager) -> CliResult<()> {
    let planned: Vec<_> = journal.iter().filter(|record| record.simulated).collect();
    if planned.is_empty() {
        return Ok(());
    }
    output.print("")?;
    output.header("Would run:")?;
    for record in planned {
        output.print(&format!("  {}", record.message))?;
    }
    Ok(())
}

/// `Complete` is success; anything else becomes `ProvisionFailed`.
fn outcome(report: ProvisionReport) -> CliResult<()> {
    let status = report.status();
    if status == ProvisionStatus::Complete {
        return Ok(());
    }
    match report.failure {
        Some(failure) => Err(CliError::ProvisionFailed {
            step: failure.step,
            status,
            cause: failure.error,
        }),
        None => Err(CliError::Core(DevhostError::Internal {
            message: format!("run ended in state {} without a recorded failure", report.state),
        })),
    }
}
