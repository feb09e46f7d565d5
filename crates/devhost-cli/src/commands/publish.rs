//! Implementation of the `devhost publish` command.

use std::path::Path;

use tracing::instrument;

use devhost_adapters::GithubPublisher;
use devhost_core::{application::ports::RepositoryPublisher, domain::DomainValidator};

use crate::{
    cli::{PublishArgs, global::GlobalArgs},
    commands::new::resolve_root,
    config::AppConfig,
    context,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(path = %args.path.display()))]
pub fn execute(
    args: PublishArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let publisher = GithubPublisher::from_env().ok_or(CliError::MissingToken)?;

    let project_dir = resolve_root(Some(&args.path), &config.paths.projects_root)?;
    if !project_dir.is_dir() {
        return Err(CliError::ProjectMissing { path: project_dir });
    }
    let name = repository_name(args.name.as_deref(), &project_dir)?;

    let executor = context::executor(&config, global.execution_mode());
    let url = publisher.publish(&executor, &project_dir, &name, args.private)?;

    if output.is_json() {
        output.json(&serde_json::json!({
            "repository": name,
            "url": url,
            "dry_run": executor.is_dry_run(),
        }))?;
    } else if executor.is_dry_run() {
        output.info(&format!("Would publish {} as {name}", project_dir.display()))?;
    } else {
        output.success(&format!("Published {url}"))?;
    }
    Ok(())
}

/// `--name`, else the directory name; either must be a valid project name.
fn repository_name(flag: Option<&str>, project_dir: &Path) -> CliResult<String> {
    let name = match flag {
        Some(name) => name.to_string(),
        None => project_dir
            .canonicalize()
            .unwrap_or_else(|_| project_dir.to_path_buf())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    DomainValidator::validate_project_name(&name).map_err(|e| CliError::Core(e.into()))?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn name_defaults_to_the_directory() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("shop");
        std::fs::create_dir(&project).unwrap();
        assert_eq!(repository_name(None, &project).unwrap(), "shop");
        assert_eq!(repository_name(Some("shop-site"), &project).unwrap(), "shop-site");
    }

    #[test]
    fn invalid_names_are_rejected() {
        let err = repository_name(Some("bad name"), Path::new("/srv/www/shop")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
