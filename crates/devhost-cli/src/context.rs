//! Wires the production adapters into the core services.

use std::sync::Arc;

use devhost_adapters::{
    ApacheEngine, FileDomainLocks, LocalFilesystem, MongoEngine, MysqlEngine, NginxEngine,
    SqliteEngine, SystemProcessRunner, SystemctlServiceManager, TcpPortProbe, TomlResourceStore,
    certs, scaffolders,
};
use devhost_core::{
    application::{
        ActionExecutor, CertificateProvisioner, DatabaseProvisioner, HostsWriter,
        OrchestratorSettings, PortAllocator, ProvisioningOrchestrator, ProvisioningServices,
        ResourceRegistry, ScaffoldDispatcher, VhostWriter,
        ports::{DatabaseEngine, WebServerEngine},
    },
    domain::ExecutionMode,
};

use crate::config::AppConfig;
use crate::prompt::terminal_prompt;

/// The single executor of a run.
pub fn executor(config: &AppConfig, mode: ExecutionMode) -> Arc<ActionExecutor> {
    Arc::new(ActionExecutor::new(
        mode,
        Box::new(LocalFilesystem::new()),
        Box::new(SystemProcessRunner::new(config.process_timeout())),
        Box::new(TcpPortProbe::new()),
        terminal_prompt(),
    ))
}

pub fn registry(config: &AppConfig, executor: &Arc<ActionExecutor>) -> Arc<ResourceRegistry> {
    Arc::new(ResourceRegistry::new(
        executor.clone(),
        Box::new(TomlResourceStore::with_path(config.registry_path())),
    ))
}

/// Web server engines with the configured site directories.
pub fn web_engines(config: &AppConfig) -> Vec<Box<dyn WebServerEngine>> {
    vec![
        Box::new(ApacheEngine::with_dirs(
            &config.apache.sites_available,
            &config.apache.sites_enabled,
        )),
        Box::new(NginxEngine::with_dirs(
            &config.nginx.sites_available,
            &config.nginx.sites_enabled,
        )),
    ]
}

pub fn database_engines(config: &AppConfig) -> Vec<Box<dyn DatabaseEngine>> {
    vec![
        Box::new(MysqlEngine::new(
            &config.mysql.admin_user,
            &config.mysql.host,
            config.mysql.port,
        )),
        Box::new(SqliteEngine),
        Box::new(MongoEngine::new(&config.mongo.host, config.mongo.port)),
    ]
}

/// Orchestrator over every production service.
pub fn orchestrator(config: &AppConfig, executor: Arc<ActionExecutor>) -> ProvisioningOrchestrator {
    let registry = registry(config, &executor);

    let services = ProvisioningServices {
        registry: registry.clone(),
        ports: PortAllocator::new(executor.clone()),
        scaffold: ScaffoldDispatcher::with_scaffolders(
            executor.clone(),
            scaffolders::default_scaffolders(),
        ),
        hosts: HostsWriter::new(executor.clone(), registry.clone(), &config.paths.hosts_file),
        certificates: CertificateProvisioner::new(
            executor.clone(),
            registry.clone(),
            &config.paths.cert_dir,
            certs::default_issuers(),
        ),
        vhosts: VhostWriter::new(
            executor.clone(),
            registry.clone(),
            web_engines(config),
            Arc::new(SystemctlServiceManager),
        ),
        database: DatabaseProvisioner::new(executor.clone(), registry, database_engines(config)),
    };

    let settings = OrchestratorSettings {
        start_port: config.ports.start,
        php_fpm_socket: config.php.fpm_socket.clone(),
        proxy_host: config.proxy.host.clone(),
    };

    ProvisioningOrchestrator::new(
        executor,
        Box::new(FileDomainLocks::new(&config.paths.state_dir)),
        services,
        settings,
    )
}
