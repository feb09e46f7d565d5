//! Provisioning Orchestrator - drives one project through the state machine.
//!
//! ```text
//! preflight ─→ scaffold ─→ hosts ─→ tls? ─→ vhost ─→ database? ─→ complete
//! ```
//!
//! Preflight (validation, port allocation, domain lock) never mutates, so a
//! failure there is a clean abort. After that every step is recorded as it
//! finishes; on the first failure the run stops, nothing is rolled back, and
//! the report names the failed step, its cause and what was committed.
//! Every step is idempotent, so re-running after fixing the cause is safe.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{error, info, instrument, warn};

use crate::{
    application::{
        ActionExecutor,
        ports::{DomainLockGuard, DomainLocks, ScaffoldContext},
    },
    domain::{
        AppBackend, CertificateBundle, ConnectionParams, DbEngine, DomainValidator,
        ManagedResource, OrchestrationState, ProjectRequest, ServingMode, Step, StepOutcome,
        StepRecord, VhostDescriptor, serving_mode,
    },
    error::{DevhostError, DevhostResult},
};

use super::{
    Applied, CertificateProvisioner, DEFAULT_START_PORT, DatabaseProvisioner, HostsWriter,
    PortAllocator, ResourceRegistry, ScaffoldDispatcher, VhostWriter,
};

/// Host-specific values the orchestrator needs to build vhosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// First port tried when the request names none.
    pub start_port: u16,
    /// php-fpm socket for PHP stacks.
    pub php_fpm_socket: PathBuf,
    /// Address proxied stacks listen on.
    pub proxy_host: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            start_port: DEFAULT_START_PORT,
            php_fpm_socket: PathBuf::from("/run/php/php-fpm.sock"),
            proxy_host: "127.0.0.1".into(),
        }
    }
}

/// The components the orchestrator sequences.
pub struct ProvisioningServices {
    pub registry: Arc<ResourceRegistry>,
    pub ports: PortAllocator,
    pub scaffold: ScaffoldDispatcher,
    pub hosts: HostsWriter,
    pub certificates: CertificateProvisioner,
    pub vhosts: VhostWriter,
    pub database: DatabaseProvisioner,
}

/// Overall result classification, mapped to exit codes by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionStatus {
    Complete,
    FailedBeforeMutation,
    FailedWithPartialCommits,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: Step,
    #[serde(serialize_with = "serialize_display")]
    pub error: DevhostError,
}

fn serialize_display<S: Serializer>(error: &DevhostError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Where the database credentials went. Never carries the secret.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseSummary {
    pub engine: DbEngine,
    pub database: String,
    pub username: Option<String>,
    pub sidecar: PathBuf,
    pub connection: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub project: String,
    pub project_path: PathBuf,
    pub domain: String,
    pub port: Option<u16>,
    pub document_root: Option<PathBuf>,
    pub dry_run: bool,
    pub steps: Vec<StepRecord>,
    pub committed: Vec<ManagedResource>,
    pub database: Option<DatabaseSummary>,
    pub state: OrchestrationState,
    pub failure: Option<StepFailure>,
}

impl ProvisionReport {
    fn new(request: &ProjectRequest, dry_run: bool) -> Self {
        Self {
            project: request.name().to_string(),
            project_path: request.project_dir(),
            domain: request.domain().to_string(),
            port: None,
            document_root: None,
            dry_run,
            steps: Vec::new(),
            committed: Vec::new(),
            database: None,
            state: OrchestrationState::Requested,
            failure: None,
        }
    }

    pub fn status(&self) -> ProvisionStatus {
        if self.state == OrchestrationState::Complete {
            ProvisionStatus::Complete
        } else if self.steps.iter().any(|record| record.outcome.mutated()) {
            ProvisionStatus::FailedWithPartialCommits
        } else {
            ProvisionStatus::FailedBeforeMutation
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == ProvisionStatus::Complete
    }

    /// Step sequence without outcomes, for comparing runs.
    pub fn step_names(&self) -> Vec<Step> {
        self.steps.iter().map(|record| record.step).collect()
    }

    pub fn outcome_of(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeardownReport {
    pub domain: String,
    pub dry_run: bool,
    pub removed_vhosts: Vec<PathBuf>,
    pub hosts_entry_removed: bool,
    pub certificate_removed: bool,
    pub project_purged: bool,
}

pub struct ProvisioningOrchestrator {
    executor: Arc<ActionExecutor>,
    locks: Box<dyn DomainLocks>,
    services: ProvisioningServices,
    settings: OrchestratorSettings,
}

impl ProvisioningOrchestrator {
    pub fn new(
        executor: Arc<ActionExecutor>,
        locks: Box<dyn DomainLocks>,
        services: ProvisioningServices,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            executor,
            locks,
            services,
            settings,
        }
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    pub fn services(&self) -> &ProvisioningServices {
        &self.services
    }

    /// Run the full sequence for `request`.
    #[instrument(
        skip_all,
        fields(
            project = %request.name(),
            domain = %request.domain(),
            mode = %self.executor.mode()
        )
    )]
    pub fn provision(&self, request: &ProjectRequest) -> ProvisionReport {
        let mut run = Run {
            report: ProvisionReport::new(request, self.executor.is_dry_run()),
            executor: &self.executor,
        };
        info!(%request, "provisioning");

        // Requested: nothing on the host changes until preflight passes.
        let (port, _lock) = match self.preflight(request) {
            Ok(ready) => ready,
            Err(e) => {
                run.fail(Step::Preflight, e);
                return run.report;
            }
        };
        run.report.port = Some(port);
        let project_dir = request.project_dir();

        // Scaffolding
        if !run.advance() {
            return run.report;
        }
        let ctx = ScaffoldContext {
            name: request.name().to_string(),
            target_dir: project_dir.clone(),
            stack: request.stack(),
            port,
        };
        let Some(document_root) = run.step(Step::Scaffold, || self.services.scaffold.generate(&ctx))
        else {
            return run.report;
        };
        run.report.document_root = Some(document_root.clone());

        // NetworkWiring
        if !run.advance() {
            return run.report;
        }
        let hosts_step = || self.services.hosts.ensure_mapping(request.domain());
        if run.step(Step::Hosts, hosts_step).is_none() {
            return run.report;
        }

        // Tls
        if !run.advance() {
            return run.report;
        }
        let Some(bundle) = run.step(Step::Tls, || self.tls_step(request)) else {
            return run.report;
        };

        // VhostWiring
        if !run.advance() {
            return run.report;
        }
        let vhost_step = || -> DevhostResult<Applied<Vec<PathBuf>>> {
            let vhost = self.describe_vhost(request, &document_root, port, bundle.clone())?;
            self.services.vhosts.install(&vhost, request.backends())
        };
        if run.step(Step::Vhost, vhost_step).is_none() {
            return run.report;
        }

        // DatabaseWiring
        if !run.advance() {
            return run.report;
        }
        let Some(summary) = run.step(Step::Database, || self.database_step(request, &project_dir))
        else {
            return run.report;
        };
        run.report.database = summary;

        // Complete
        run.advance();
        info!(status = ?run.report.status(), "provisioning finished");
        run.report
    }

    /// Remove what provisioning created for `domain`.
    ///
    /// Vhosts, the hosts mapping and the certificate pair are deleted and
    /// forgotten, but only those the registry says devhost created. The project directory is only removed with `purge` and after
    /// confirmation; databases are never dropped.
    #[instrument(skip(self, project_dir), fields(mode = %self.executor.mode()))]
    pub fn teardown(
        &self,
        domain: &str,
        project_dir: &Path,
        purge: bool,
    ) -> DevhostResult<TeardownReport> {
        DomainValidator::validate_domain(domain)?;
        let _lock = self.lock(domain)?;

        let removed_vhosts = self.services.vhosts.remove(domain)?;
        let hosts_entry_removed = self.services.hosts.remove_mapping(domain)?;
        let certificate_removed = self.services.certificates.remove(domain)?;

        let mut project_purged = false;
        if purge && self.executor.exists(project_dir) {
            let question = format!("Delete {} and everything in it? [y/N]", project_dir.display());
            if self.executor.confirm(&question)? {
                self.executor.remove_dir_all(project_dir)?;
                project_purged = true;
            } else {
                warn!("project directory kept");
            }
        }

        Ok(TeardownReport {
            domain: domain.to_string(),
            dry_run: self.executor.is_dry_run(),
            removed_vhosts,
            hosts_entry_removed,
            certificate_removed,
            project_purged,
        })
    }

    fn preflight(&self, request: &ProjectRequest) -> DevhostResult<(u16, Option<DomainLockGuard>)> {
        DomainValidator::validate_domain(request.domain())?;
        if request.database().is_some() {
            DomainValidator::sanitize_identifier(request.name())?;
        }

        let port = self
            .services
            .ports
            .allocate(request.desired_port(), self.settings.start_port)?;
        if let Some(desired) = request.desired_port().filter(|&desired| desired != port) {
            self.executor
                .warn(format!("port {desired} is in use, using {port} instead"));
        }

        let lock = self.lock(request.domain())?;
        Ok((port, lock))
    }

    /// Domain lock; dry runs take none.
    fn lock(&self, domain: &str) -> DevhostResult<Option<DomainLockGuard>> {
        if self.executor.is_dry_run() {
            return Ok(None);
        }
        self.locks.try_acquire(domain).map(Some)
    }

    fn tls_step(&self, request: &ProjectRequest) -> DevhostResult<Applied<Option<CertificateBundle>>> {
        if !request.tls() {
            return Ok(Applied::skipped(None, "not requested"));
        }
        let applied = self.services.certificates.obtain(request.domain())?;
        Ok(Applied {
            value: Some(applied.value),
            outcome: applied.outcome,
            resources: applied.resources,
        })
    }

    fn database_step(
        &self,
        request: &ProjectRequest,
        project_dir: &Path,
    ) -> DevhostResult<Applied<Option<DatabaseSummary>>> {
        let Some(engine) = request.database() else {
            return Ok(Applied::skipped(None, "not requested"));
        };
        let applied = self
            .services
            .database
            .provision(engine, request.name(), project_dir)?;
        let summary = applied.value.map(|credential| DatabaseSummary {
            engine: credential.engine,
            database: credential.database,
            username: credential.username,
            sidecar: credential.sidecar_path,
            connection: match credential.connection {
                ConnectionParams::Network { host, port } => format!("{host}:{port}"),
                ConnectionParams::File { path } => path.display().to_string(),
            },
        });
        Ok(Applied {
            value: summary,
            outcome: applied.outcome,
            resources: applied.resources,
        })
    }

    fn describe_vhost(
        &self,
        request: &ProjectRequest,
        document_root: &Path,
        port: u16,
        bundle: Option<CertificateBundle>,
    ) -> DevhostResult<VhostDescriptor> {
        let backend = match serving_mode(request.stack().tag()) {
            ServingMode::Static => AppBackend::Static,
            ServingMode::Php => AppBackend::PhpFpm {
                socket: self.settings.php_fpm_socket.clone(),
            },
            ServingMode::Proxy => AppBackend::Proxy {
                host: self.settings.proxy_host.clone(),
                port,
            },
        };
        let vhost = VhostDescriptor::new(request.domain(), document_root, backend)?;
        Ok(match bundle {
            Some(bundle) => vhost.with_tls(bundle),
            None => vhost,
        })
    }
}

/// Report under construction plus the transitions that update it.
struct Run<'a> {
    report: ProvisionReport,
    executor: &'a ActionExecutor,
}

impl Run<'_> {
    /// Move to the next state. Returns false if the transition was refused.
    fn advance(&mut self) -> bool {
        match self.report.state.advance() {
            Ok(next) => {
                self.report.state = next;
                true
            }
            Err(e) => {
                error!(error = %e, "invalid orchestration transition");
                let step = self.report.state.step().unwrap_or(Step::Preflight);
                self.fail(step, e.into());
                false
            }
        }
    }

    /// Run one step, recording its outcome. `None` means the run is over.
    fn step<T>(&mut self, step: Step, action: impl FnOnce() -> DevhostResult<Applied<T>>) -> Option<T> {
        let before = self.executor.mutation_count();
        match action() {
            Ok(applied) => {
                info!(%step, outcome = %applied.outcome, "step finished");
                self.report.steps.push(StepRecord::new(step, applied.outcome));
                self.report.committed.extend(applied.resources);
                Some(applied.value)
            }
            Err(e) => {
                let outcome = if self.executor.mutation_count() > before {
                    StepOutcome::FailedAfterChanges
                } else {
                    StepOutcome::Failed
                };
                self.report.steps.push(StepRecord::new(step, outcome));
                self.fail(step, e);
                None
            }
        }
    }

    fn fail(&mut self, step: Step, error: DevhostError) {
        error!(%step, error = %error, "provisioning step failed");
        if let Ok(failed) = self.report.state.fail(step, error.to_string()) {
            self.report.state = failed;
        }
        self.report.failure = Some(StepFailure { step, error });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::executor::test_executor;
    use crate::domain::ExecutionMode;

    fn report(steps: Vec<StepRecord>, state: OrchestrationState) -> ProvisionReport {
        let request = ProjectRequest::builder("blog")
            .stack(crate::domain::StackKind::Static)
            .root("/srv")
            .build()
            .unwrap();
        let mut report = ProvisionReport::new(&request, false);
        report.steps = steps;
        report.state = state;
        report
    }

    #[test]
    fn complete_state_means_complete_status() {
        let r = report(
            vec![StepRecord::new(Step::Scaffold, StepOutcome::Committed)],
            OrchestrationState::Complete,
        );
        assert_eq!(r.status(), ProvisionStatus::Complete);
    }

    #[test]
    fn failure_without_mutations_is_before_mutation() {
        let r = report(
            vec![
                StepRecord::new(Step::Scaffold, StepOutcome::AlreadyPresent),
                StepRecord::new(Step::Hosts, StepOutcome::Failed),
            ],
            OrchestrationState::Failed {
                step: Step::Hosts,
                cause: "conflict".into(),
            },
        );
        assert_eq!(r.status(), ProvisionStatus::FailedBeforeMutation);
    }

    #[test]
    fn failure_after_a_commit_is_partial() {
        let r = report(
            vec![
                StepRecord::new(Step::Scaffold, StepOutcome::Committed),
                StepRecord::new(Step::Hosts, StepOutcome::Failed),
            ],
            OrchestrationState::Failed {
                step: Step::Hosts,
                cause: "backup".into(),
            },
        );
        assert_eq!(r.status(), ProvisionStatus::FailedWithPartialCommits);
    }

    #[test]
    fn run_records_failure_and_state() {
        let exec = test_executor(ExecutionMode::live());
        let mut run = Run {
            report: report(vec![], OrchestrationState::Requested),
            executor: &exec,
        };
        assert!(run.advance());
        let value: Option<()> = run.step(Step::Scaffold, || {
            Err(ApplicationError::Scaffold {
                stack: "static".into(),
                reason: "disk full".into(),
            }
            .into())
        });
        assert!(value.is_none());
        assert_eq!(run.report.outcome_of(Step::Scaffold), Some(&StepOutcome::Failed));
        assert!(matches!(
            run.report.state,
            OrchestrationState::Failed { step: Step::Scaffold, .. }
        ));
        assert_eq!(run.report.failure.as_ref().unwrap().step, Step::Scaffold);
    }

    #[test]
    fn step_that_changed_the_host_before_failing_is_a_partial_commit() {
        let exec = test_executor(ExecutionMode::unattended());
        let mut run = Run {
            report: report(vec![], OrchestrationState::Requested),
            executor: &exec,
        };
        assert!(run.advance());
        let value: Option<()> = run.step(Step::Scaffold, || {
            // A generator that wrote something, then gave up.
            exec.execute("write composer.json", || Ok(()))?;
            Err(ApplicationError::Scaffold {
                stack: "framework-php".into(),
                reason: "composer exited with 1".into(),
            }
            .into())
        });
        assert!(value.is_none());
        assert_eq!(
            run.report.outcome_of(Step::Scaffold),
            Some(&StepOutcome::FailedAfterChanges)
        );
        assert_eq!(run.report.status(), ProvisionStatus::FailedWithPartialCommits);
    }
}
