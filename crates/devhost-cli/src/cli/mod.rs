//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use devhost_core::domain::{DbEngine, ResourceKind, StackKind, WebServerKind};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "devhost",
    bin_name = "devhost",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Local web-development environments in one command",
    long_about = "devhost scaffolds a project and wires it into the local machine: \
                  a hosts entry, a TLS certificate, web server virtual hosts, a free \
                  port and an optional database.",
    after_help = "EXAMPLES:\n\
        \x20 devhost new blog --stack static\n\
        \x20 devhost new shop --stack framework-php --tls --db mysql --server nginx\n\
        \x20 devhost new dash --stack node-spa:react --port 5173 --dry-run\n\
        \x20 devhost remove blog --purge\n\
        \x20 devhost completions bash > /usr/share/bash-completion/completions/devhost",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scaffold a project and wire it into the local machine.
    #[command(
        visible_alias = "n",
        about = "Create and provision a new project",
        after_help = "STACKS:\n\
            \x20 framework-php              Laravel through php-fpm\n\
            \x20 cms                        WordPress through php-fpm\n\
            \x20 static                     Plain HTML\n\
            \x20 static-bootstrap           HTML with Bootstrap assets\n\
            \x20 node-spa[:react|vue|svelte|preact|vanilla]\n\
            \x20 node-server                Node HTTP server behind a proxy\n\
            \x20 dotnet-app[:webapp|mvc|webapi|blazor]\n\n\
            EXAMPLES:\n\
            \x20 devhost new blog --stack static\n\
            \x20 devhost new shop --stack framework-php --tls --db mysql"
    )]
    New(NewArgs),

    /// Remove what `new` created for a project.
    #[command(
        visible_alias = "rm",
        about = "Tear down a provisioned project",
        after_help = "EXAMPLES:\n\
            \x20 devhost remove blog\n\
            \x20 devhost remove blog --purge --yes"
    )]
    Remove(RemoveArgs),

    /// List the resources devhost manages.
    #[command(
        visible_alias = "ls",
        about = "List managed resources",
        after_help = "EXAMPLES:\n\
            \x20 devhost list\n\
            \x20 devhost list --kind certificate\n\
            \x20 devhost --output-format json list"
    )]
    List(ListArgs),

    /// Report which host capabilities are available.
    #[command(about = "Check host prerequisites")]
    Doctor,

    /// Install and start the web servers, databases and tools devhost drives.
    #[command(
        about = "Install host prerequisites",
        after_help = "EXAMPLES:\n\
            \x20 devhost setup --server nginx --db mysql --mkcert\n\
            \x20 devhost setup --dry-run"
    )]
    Setup(SetupArgs),

    /// Push a project to a new GitHub repository.
    #[command(
        about = "Publish a project to GitHub",
        after_help = "Reads the token from GITHUB_TOKEN.\n\n\
            EXAMPLES:\n\
            \x20 devhost publish ./blog\n\
            \x20 devhost publish ./shop --name shop-site --private"
    )]
    Publish(PublishArgs),

    /// Manage the devhost configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 devhost config show\n\
            \x20 devhost config path\n\
            \x20 devhost config init --force"
    )]
    Config(ConfigCommands),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 devhost completions bash > ~/.local/share/bash-completion/completions/devhost\n\
            \x20 devhost completions zsh  > ~/.zfunc/_devhost\n\
            \x20 devhost completions fish > ~/.config/fish/completions/devhost.fish"
    )]
    Completions(CompletionsArgs),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `devhost new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Project name; also the directory created under the root.
    #[arg(value_name = "NAME", help = "Project name")]
    pub name: String,

    /// Stack tag, optionally with a variant (`node-spa:vue`).
    #[arg(short = 's', long = "stack", value_name = "STACK", help = "Project stack")]
    pub stack: StackKind,

    /// Parent directory of the project.
    #[arg(
        short = 'r',
        long = "root",
        value_name = "DIR",
        help = "Parent directory (default: projects_root from config)"
    )]
    pub root: Option<PathBuf>,

    /// Desired application port; the next free one is used if it is taken.
    #[arg(short = 'p', long = "port", value_name = "PORT", help = "Preferred port")]
    pub port: Option<u32>,

    /// Local domain (default `<name>.local`).
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN", help = "Local domain")]
    pub domain: Option<String>,

    /// Serve over HTTPS with a locally trusted or self-signed certificate.
    #[arg(long = "tls", help = "Enable HTTPS")]
    pub tls: bool,

    /// Database to create for the project.
    #[arg(long = "db", value_enum, value_name = "ENGINE", help = "Database engine")]
    pub database: Option<DbArg>,

    /// Web servers to configure; repeat for several. Default: every one installed.
    #[arg(
        long = "server",
        value_enum,
        value_name = "SERVER",
        action = clap::ArgAction::Append,
        help = "Web server backend (repeatable)"
    )]
    pub servers: Vec<ServerArg>,
}

// ── remove ────────────────────────────────────────────────────────────────────

/// Arguments for `devhost remove`.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Project name.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Domain the project was provisioned under (default `<name>.local`).
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Parent directory of the project.
    #[arg(short = 'r', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Also delete the project directory (asks first unless --yes).
    #[arg(long = "purge", help = "Delete the project directory too")]
    pub purge: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `devhost list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show resources of this kind.
    #[arg(
        short = 'k',
        long = "kind",
        value_name = "KIND",
        help = "Filter by kind (hosts-entry, certificate, apache-vhost, nginx-vhost, database)"
    )]
    pub kind: Option<ResourceKind>,
}

// ── setup ─────────────────────────────────────────────────────────────────────

/// Arguments for `devhost setup`.
#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Web servers to install and start.
    #[arg(long = "server", value_enum, action = clap::ArgAction::Append)]
    pub servers: Vec<ServerArg>,

    /// Database engines to install and start.
    #[arg(long = "db", value_enum, action = clap::ArgAction::Append)]
    pub databases: Vec<DbArg>,

    /// Install mkcert and its local certificate authority.
    #[arg(long = "mkcert")]
    pub mkcert: bool,
}

// ── publish ───────────────────────────────────────────────────────────────────

/// Arguments for `devhost publish`.
#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Project directory.
    #[arg(value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Repository name (default: the directory name).
    #[arg(short = 'n', long = "name", value_name = "REPO")]
    pub name: Option<String>,

    /// Create a private repository.
    #[arg(long = "private")]
    pub private: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `devhost completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `devhost config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,
    /// Print the path of the configuration file in use.
    Path,
    /// Write a configuration file with the built-in defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Database engines selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum DbArg {
    /// MySQL or MariaDB. Also accepted as `mariadb`.
    #[value(alias = "mariadb")]
    Mysql,
    Sqlite,
    /// Also accepted as `mongodb`.
    #[value(alias = "mongodb")]
    Mongo,
}

impl From<DbArg> for DbEngine {
    fn from(arg: DbArg) -> Self {
        match arg {
            DbArg::Mysql => Self::Mysql,
            DbArg::Sqlite => Self::Sqlite,
            DbArg::Mongo => Self::Mongo,
        }
    }
}

/// Web servers selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ServerArg {
    /// Also accepted as `httpd`.
    #[value(alias = "httpd")]
    Apache,
    Nginx,
}

impl From<ServerArg> for WebServerKind {
    fn from(arg: ServerArg) -> Self {
        match arg {
            ServerArg::Apache => Self::Apache,
            ServerArg::Nginx => Self::Nginx,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use devhost_core::domain::{SpaVariant, StackTag};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "devhost", "new", "shop", "--stack", "framework-php", "--tls", "--db", "mysql",
            "--server", "nginx", "--server", "apache",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.stack.tag(), StackTag::FrameworkPhp);
        assert!(args.tls);
        assert_eq!(args.database, Some(DbArg::Mysql));
        assert_eq!(args.servers, vec![ServerArg::Nginx, ServerArg::Apache]);
    }

    #[test]
    fn stack_variant_is_parsed() {
        let cli = Cli::parse_from(["devhost", "new", "dash", "-s", "node-spa:vue"]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.stack, StackKind::NodeSpa(SpaVariant::Vue));
    }

    #[test]
    fn unknown_stack_is_rejected() {
        assert!(Cli::try_parse_from(["devhost", "new", "x", "--stack", "cobol"]).is_err());
    }

    #[test]
    fn mariadb_alias() {
        let cli = Cli::parse_from(["devhost", "new", "x", "-s", "static", "--db", "mariadb"]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.database.map(DbEngine::from), Some(DbEngine::Mysql));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["devhost", "remove", "blog", "--dry-run", "-y"]);
        let mode = cli.global.execution_mode();
        assert!(mode.is_dry_run());
        assert!(mode.assume_yes());
    }

    #[test]
    fn list_kind_filter() {
        let cli = Cli::parse_from(["devhost", "list", "--kind", "nginx-vhost"]);
        let Commands::List(args) = cli.command else {
            panic!("expected List command");
        };
        assert_eq!(args.kind, Some(ResourceKind::NginxVhost));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["devhost", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }
}
