//! Implementation of the `devhost list` command.

use devhost_core::domain::ManagedResource;

use crate::{
    cli::{ListArgs, global::GlobalArgs},
    config::AppConfig,
    context,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let executor = context::executor(&config, global.execution_mode());
    let registry = context::registry(&config, &executor);

    let mut resources: Vec<ManagedResource> = registry
        .list()?
        .into_iter()
        .filter(|resource| args.kind.is_none_or(|kind| resource.kind == kind))
        .collect();
    resources.sort_by(|a, b| (a.kind, &a.key).cmp(&(b.kind, &b.key)));

    if output.is_json() {
        output.json(&resources)?;
        return Ok(());
    }

    if resources.is_empty() {
        output.info(&format!("No managed resources in {}", registry.location()))?;
        return Ok(());
    }

    output.header(&format!("Managed resources ({})", registry.location()))?;
    for resource in &resources {
        output.print(&row(resource))?;
    }
    Ok(())
}

fn row(resource: &ManagedResource) -> String {
    format!(
        "  {:<13} {:<28} {:<19} {}",
        resource.kind.as_str(),
        resource.key,
        resource.created_at.format("%Y-%m-%d %H:%M:%S"),
        resource.detail.as_deref().unwrap_or("-"),
    )
}
