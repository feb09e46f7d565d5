//! Implementation of the `devhost setup` command.
//!
//! Installs the Debian packages behind each selected component and makes
//! sure its service is running. Without selections it sets up nginx and
//! mkcert, the pair `new` needs for a TLS-served static site.

use std::collections::HashSet;

use tracing::{info, instrument};

use devhost_adapters::{AptPackageManager, MkcertIssuer, SystemctlServiceManager};
use devhost_core::application::ports::{CertificateIssuer, PackageManager, ServiceManager};

use crate::{
    cli::{DbArg, ServerArg, SetupArgs, global::GlobalArgs},
    config::AppConfig,
    context,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Packages to install and the service to keep running.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Component {
    name: &'static str,
    packages: &'static [&'static str],
    service: Option<&'static str>,
}

const fn server(arg: ServerArg) -> Component {
    match arg {
        ServerArg::Apache => Component {
            name: "apache",
            packages: &["apache2"],
            service: Some("apache2"),
        },
        ServerArg::Nginx => Component {
            name: "nginx",
            packages: &["nginx"],
            service: Some("nginx"),
        },
    }
}

const fn database(arg: DbArg) -> Component {
    match arg {
        DbArg::Mysql => Component {
            name: "mysql",
            packages: &["mariadb-server", "mariadb-client"],
            service: Some("mariadb"),
        },
        DbArg::Sqlite => Component {
            name: "sqlite",
            packages: &["sqlite3"],
            service: None,
        },
        DbArg::Mongo => Component {
            name: "mongo",
            packages: &["mongodb-org"],
            service: Some("mongod"),
        },
    }
}

const MKCERT: Component = Component {
    name: "mkcert",
    packages: &["mkcert", "libnss3-tools"],
    service: None,
};

fn plan(args: &SetupArgs) -> Vec<Component> {
    let mut components: Vec<Component> = args.servers.iter().copied().map(server).collect();
    components.extend(args.databases.iter().copied().map(database));
    if args.mkcert {
        components.push(MKCERT);
    }
    if components.is_empty() {
        components = vec![server(ServerArg::Nginx), MKCERT];
    }
    let mut seen = HashSet::new();
    components.retain(|c| seen.insert(c.name));
    components
}

#[instrument(skip_all)]
pub fn execute(
    args: SetupArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let components = plan(&args);
    let executor = context::executor(&config, global.execution_mode());

    let names: Vec<&str> = components.iter().map(|c| c.name).collect();
    let question = format!("Install and start {}? [y/N]", names.join(", "));
    if !executor.is_dry_run() && !executor.confirm(&question)? {
        return Err(CliError::Cancelled);
    }

    let packages = AptPackageManager;
    let services = SystemctlServiceManager;
    for component in &components {
        info!(component = component.name, "setting up");
        packages.ensure_installed(&executor, component.packages)?;
        if let Some(service) = component.service {
            services.ensure_running(&executor, service)?;
        }
        if component.name == MKCERT.name {
            MkcertIssuer.prepare(&executor)?;
        }
        output.success(&format!("{} ready", component.name))?;
    }

    if executor.is_dry_run() {
        output.info("Dry run: nothing was installed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(servers: Vec<ServerArg>, databases: Vec<DbArg>, mkcert: bool) -> SetupArgs {
        SetupArgs {
            servers,
            databases,
            mkcert,
        }
    }

    #[test]
    fn empty_selection_sets_up_nginx_and_mkcert() {
        let names: Vec<_> = plan(&args(vec![], vec![], false))
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["nginx", "mkcert"]);
    }

    #[test]
    fn repeated_selections_are_planned_once() {
        let planned = plan(&args(
            vec![ServerArg::Apache, ServerArg::Nginx, ServerArg::Apache],
            vec![DbArg::Mysql],
            false,
        ));
        assert_eq!(planned.len(), 3);
        assert_eq!(planned[0].service, Some("apache2"));
        assert_eq!(planned[2].service, Some("mariadb"));
    }

    #[test]
    fn sqlite_has_no_service() {
        assert_eq!(database(DbArg::Sqlite).service, None);
    }
}
