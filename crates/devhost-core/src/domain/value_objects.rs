//! Domain value objects: StackKind, ResourceKind, DbEngine, WebServerKind,
//! ExecutionMode.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! They hold NO capability logic. What a stack needs in order to be served
//! lives in `capabilities.rs`. This file's only job is to define the types,
//! their string representations, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Add a capability entry in `capabilities.rs`
//! 4. Register a scaffolder for it in `devhost-adapters`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── StackKind ─────────────────────────────────────────────────────────────────

/// The technology stack a project is scaffolded with.
///
/// A tagged variant: [`StackTag`] is the registry key, the payload carries
/// stack-specific generator options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "options")]
pub enum StackKind {
    /// PHP application framework (Laravel).
    FrameworkPhp,
    /// Content management system (WordPress).
    Cms,
    /// Plain HTML.
    Static,
    /// Single-page application built with Vite.
    NodeSpa(SpaVariant),
    /// Node HTTP server.
    NodeServer,
    /// .NET web application.
    DotnetApp(DotnetTemplate),
    /// Plain HTML with Bootstrap.
    StaticBootstrap,
}

impl StackKind {
    /// The registry key for this stack, without its payload.
    pub const fn tag(&self) -> StackTag {
        match self {
            Self::FrameworkPhp => StackTag::FrameworkPhp,
            Self::Cms => StackTag::Cms,
            Self::Static => StackTag::Static,
            Self::NodeSpa(_) => StackTag::NodeSpa,
            Self::NodeServer => StackTag::NodeServer,
            Self::DotnetApp(_) => StackTag::DotnetApp,
            Self::StaticBootstrap => StackTag::StaticBootstrap,
        }
    }

    /// Generator option carried by the variant, if any.
    pub const fn option(&self) -> Option<&'static str> {
        match self {
            Self::NodeSpa(variant) => Some(variant.as_str()),
            Self::DotnetApp(template) => Some(template.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.option() {
            Some(option) => write!(f, "{}:{}", self.tag(), option),
            None => f.write_str(self.tag().as_str()),
        }
    }
}

impl FromStr for StackKind {
    type Err = DomainError;

    /// Parses `tag` or `tag:option`, e.g. `node-spa:vue`, `dotnet-app:webapi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let (tag, option) = match lowered.split_once(':') {
            Some((tag, option)) => (tag, Some(option)),
            None => (lowered.as_str(), None),
        };

        let tag: StackTag = tag.parse()?;
        let stack = match tag {
            StackTag::NodeSpa => {
                Self::NodeSpa(option.map(str::parse).transpose()?.unwrap_or_default())
            }
            StackTag::DotnetApp => {
                Self::DotnetApp(option.map(str::parse).transpose()?.unwrap_or_default())
            }
            _ if option.is_some() => {
                return Err(DomainError::UnknownStack(format!(
                    "stack '{tag}' takes no options: {s}"
                )));
            }
            StackTag::FrameworkPhp => Self::FrameworkPhp,
            StackTag::Cms => Self::Cms,
            StackTag::Static => Self::Static,
            StackTag::NodeServer => Self::NodeServer,
            StackTag::StaticBootstrap => Self::StaticBootstrap,
        };
        Ok(stack)
    }
}

/// Payload-free key identifying a [`StackKind`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackTag {
    FrameworkPhp,
    Cms,
    Static,
    NodeSpa,
    NodeServer,
    DotnetApp,
    StaticBootstrap,
}

impl StackTag {
    pub const ALL: [StackTag; 7] = [
        Self::FrameworkPhp,
        Self::Cms,
        Self::Static,
        Self::NodeSpa,
        Self::NodeServer,
        Self::DotnetApp,
        Self::StaticBootstrap,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FrameworkPhp => "framework-php",
            Self::Cms => "cms",
            Self::Static => "static",
            Self::NodeSpa => "node-spa",
            Self::NodeServer => "node-server",
            Self::DotnetApp => "dotnet-app",
            Self::StaticBootstrap => "static-bootstrap",
        }
    }
}

impl fmt::Display for StackTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "framework-php" | "laravel" | "php" => Ok(Self::FrameworkPhp),
            "cms" | "wordpress" | "wp" => Ok(Self::Cms),
            "static" | "html" => Ok(Self::Static),
            "node-spa" | "spa" => Ok(Self::NodeSpa),
            "node-server" | "node" | "express" => Ok(Self::NodeServer),
            "dotnet-app" | "dotnet" => Ok(Self::DotnetApp),
            "static-bootstrap" | "bootstrap" => Ok(Self::StaticBootstrap),
            other => Err(DomainError::UnknownStack(other.to_string())),
        }
    }
}

/// UI template for `node-spa` projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaVariant {
    #[default]
    React,
    Vue,
    Svelte,
    Preact,
    Vanilla,
}

impl SpaVariant {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::React => "react",
            Self::Vue => "vue",
            Self::Svelte => "svelte",
            Self::Preact => "preact",
            Self::Vanilla => "vanilla",
        }
    }
}

impl FromStr for SpaVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "react" => Ok(Self::React),
            "vue" => Ok(Self::Vue),
            "svelte" => Ok(Self::Svelte),
            "preact" => Ok(Self::Preact),
            "vanilla" | "js" => Ok(Self::Vanilla),
            other => Err(DomainError::UnknownStack(format!(
                "unknown node-spa variant: {other}"
            ))),
        }
    }
}

/// Project template for `dotnet-app` projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DotnetTemplate {
    #[default]
    WebApp,
    Mvc,
    WebApi,
    Blazor,
}

impl DotnetTemplate {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WebApp => "webapp",
            Self::Mvc => "mvc",
            Self::WebApi => "webapi",
            Self::Blazor => "blazor",
        }
    }
}

impl FromStr for DotnetTemplate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webapp" | "razor" => Ok(Self::WebApp),
            "mvc" => Ok(Self::Mvc),
            "webapi" | "api" => Ok(Self::WebApi),
            "blazor" => Ok(Self::Blazor),
            other => Err(DomainError::UnknownStack(format!(
                "unknown dotnet-app template: {other}"
            ))),
        }
    }
}

// ── ResourceKind ──────────────────────────────────────────────────────────────

/// Kinds of artifact the tool creates on the host and tracks in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    HostsEntry,
    Certificate,
    ApacheVhost,
    NginxVhost,
    Database,
}

impl ResourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HostsEntry => "hosts-entry",
            Self::Certificate => "certificate",
            Self::ApacheVhost => "apache-vhost",
            Self::NginxVhost => "nginx-vhost",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hosts-entry" => Ok(Self::HostsEntry),
            "certificate" => Ok(Self::Certificate),
            "apache-vhost" => Ok(Self::ApacheVhost),
            "nginx-vhost" => Ok(Self::NginxVhost),
            "database" => Ok(Self::Database),
            other => Err(DomainError::InvalidRequest(format!(
                "unknown resource kind: {other}"
            ))),
        }
    }
}

// ── DbEngine ──────────────────────────────────────────────────────────────────

/// Database engine families a project can be provisioned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEngine {
    /// MySQL / MariaDB.
    Mysql,
    /// Embedded file database.
    Sqlite,
    /// MongoDB.
    Mongo,
}

impl DbEngine {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Mongo => "mongo",
        }
    }

    /// Whether the engine authenticates with a per-project user and secret.
    pub const fn uses_credentials(&self) -> bool {
        matches!(self, Self::Mysql)
    }
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbEngine {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" | "mysql-family" => Ok(Self::Mysql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            other => Err(DomainError::UnknownEngine(other.to_string())),
        }
    }
}

// ── WebServerKind ─────────────────────────────────────────────────────────────

/// Web server backends a vhost can be rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebServerKind {
    Apache,
    Nginx,
}

impl WebServerKind {
    pub const ALL: [WebServerKind; 2] = [Self::Apache, Self::Nginx];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Apache => "apache",
            Self::Nginx => "nginx",
        }
    }

    /// Registry kind for vhost files written for this server.
    pub const fn resource_kind(&self) -> ResourceKind {
        match self {
            Self::Apache => ResourceKind::ApacheVhost,
            Self::Nginx => ResourceKind::NginxVhost,
        }
    }
}

impl fmt::Display for WebServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebServerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apache" | "apache2" | "httpd" => Ok(Self::Apache),
            "nginx" => Ok(Self::Nginx),
            other => Err(DomainError::UnknownEngine(other.to_string())),
        }
    }
}

/// Which web servers receive a vhost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelection {
    /// Every server detected on the host.
    #[default]
    Auto,
    /// Exactly these servers.
    Explicit(Vec<WebServerKind>),
}

// ── ExecutionMode ─────────────────────────────────────────────────────────────

/// Run-wide execution policy, fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMode {
    dry_run: bool,
    assume_yes: bool,
}

impl ExecutionMode {
    pub const fn new(dry_run: bool, assume_yes: bool) -> Self {
        Self {
            dry_run,
            assume_yes,
        }
    }

    /// Live, interactive.
    pub const fn live() -> Self {
        Self::new(false, false)
    }

    /// Live, never prompts.
    pub const fn unattended() -> Self {
        Self::new(false, true)
    }

    /// Simulated; prompts are answered yes.
    pub const fn dry_run() -> Self {
        Self::new(true, true)
    }

    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub const fn assume_yes(&self) -> bool {
        self.assume_yes
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.dry_run, self.assume_yes) {
            (true, _) => f.write_str("dry-run"),
            (false, true) => f.write_str("live (assume yes)"),
            (false, false) => f.write_str("live"),
        }
    }
}
