//! Implementation of the `devhost remove` command.

use tracing::instrument;

use devhost_core::{application::TeardownReport, domain::DomainValidator};

use crate::{
    cli::{RemoveArgs, global::GlobalArgs},
    commands::new::resolve_root,
    config::AppConfig,
    context,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(
    args: RemoveArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    DomainValidator::validate_project_name(&args.name).map_err(|e| CliError::Core(e.into()))?;
    let domain = args
        .domain
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DomainValidator::default_domain(&args.name));
    let project_dir = resolve_root(args.root.as_deref(), &config.paths.projects_root)?.join(&args.name);

    let executor = context::executor(&config, global.execution_mode());
    let orchestrator = context::orchestrator(&config, executor);
    let report = orchestrator.teardown(&domain, &project_dir, args.purge)?;

    if output.is_json() {
        output.json(&report)?;
    } else {
        render(&report, &output)?;
    }
    Ok(())
}

fn render(report: &TeardownReport, output: &OutputManager) -> CliResult<()> {
    let suffix = if report.dry_run { " (dry run)" } else { "" };
    let nothing = report.removed_vhosts.is_empty()
        && !report.hosts_entry_removed
        && !report.certificate_removed
        && !report.project_purged;
    if nothing {
        output.info(&format!("Nothing managed for {}{suffix}", report.domain))?;
        return Ok(());
    }

    output.header(&format!("Removed {}{suffix}", report.domain))?;
    for vhost in &report.removed_vhosts {
        output.success(&format!("virtual host {}", vhost.display()))?;
    }
    if report.hosts_entry_removed {
        output.success("hosts entry")?;
    }
    if report.certificate_removed {
        output.success("certificate")?;
    }
    if report.project_purged {
        output.success("project directory")?;
    }
    output.info("Databases are kept; drop them by hand if no longer needed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhost_core::domain::{ProjectRequest, StackKind};

    #[test]
    fn default_domain_matches_what_new_provisions() {
        let request = ProjectRequest::builder("My-Blog")
            .stack(StackKind::Static)
            .root("/srv/www")
            .build()
            .unwrap();
        assert_eq!(request.domain(), DomainValidator::default_domain("My-Blog"));
    }
}
