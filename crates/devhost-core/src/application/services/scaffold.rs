//! Scaffold Dispatcher - routes a stack to its registered generator.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::{
        ActionExecutor, ApplicationError,
        ports::{ScaffoldContext, Scaffolder},
    },
    domain::StackTag,
    error::{DevhostError, DevhostResult},
};

use super::Applied;

/// Written into the project directory once its generator succeeded.
pub const SCAFFOLD_MARKER: &str = ".devhost-scaffolded";

pub struct ScaffoldDispatcher {
    executor: Arc<ActionExecutor>,
    scaffolders: BTreeMap<StackTag, Box<dyn Scaffolder>>,
}

impl ScaffoldDispatcher {
    pub fn new(executor: Arc<ActionExecutor>) -> Self {
        Self {
            executor,
            scaffolders: BTreeMap::new(),
        }
    }

    /// Register a generator, replacing any previous one for the same stack.
    pub fn register(&mut self, scaffolder: Box<dyn Scaffolder>) -> &mut Self {
        self.scaffolders.insert(scaffolder.tag(), scaffolder);
        self
    }

    pub fn with_scaffolders(
        executor: Arc<ActionExecutor>,
        scaffolders: impl IntoIterator<Item = Box<dyn Scaffolder>>,
    ) -> Self {
        let mut dispatcher = Self::new(executor);
        for scaffolder in scaffolders {
            dispatcher.register(scaffolder);
        }
        dispatcher
    }

    /// Stacks with a registered generator.
    pub fn stacks(&self) -> Vec<StackTag> {
        self.scaffolders.keys().copied().collect()
    }

    pub fn get(&self, tag: StackTag) -> DevhostResult<&dyn Scaffolder> {
        self.scaffolders
            .get(&tag)
            .map(|scaffolder| &**scaffolder)
            .ok_or_else(|| {
                ApplicationError::CapabilityUnavailable {
                    capability: format!("{tag} generator"),
                    reason: "no scaffolder registered for this stack".into(),
                }
                .into()
            })
    }

    /// Programs the stack's generator needs that are not on PATH.
    pub fn missing_programs(&self, tag: StackTag) -> DevhostResult<Vec<&'static str>> {
        Ok(self
            .get(tag)?
            .required_programs()
            .iter()
            .copied()
            .filter(|program| !self.executor.program_exists(program))
            .collect())
    }

    /// Generate the project, or reuse one devhost finished scaffolding.
    ///
    /// A non-empty directory without the completion marker is a conflict:
    /// it belongs to someone else or to a generator that failed partway.
    #[instrument(skip_all, fields(stack = %ctx.stack, dir = %ctx.target_dir.display()))]
    pub fn generate(&self, ctx: &ScaffoldContext) -> DevhostResult<Applied<PathBuf>> {
        let tag = ctx.stack.tag();
        let scaffolder = self.get(tag)?;
        let marker = ctx.target_dir.join(SCAFFOLD_MARKER);

        if self.executor.exists(&marker) {
            info!("project already scaffolded, reusing it");
            return Ok(Applied::unchanged(scaffolder.document_root(&ctx.target_dir)));
        }
        if self.executor.exists(&ctx.target_dir)
            && !self.executor.list_dir(&ctx.target_dir)?.is_empty()
        {
            return Err(ApplicationError::ResourceConflict {
                key: ctx.target_dir.display().to_string(),
                reason: "directory is not empty and was not scaffolded by devhost".into(),
            }
            .into());
        }

        if let Some(program) = self.missing_programs(tag)?.first() {
            return Err(ApplicationError::CapabilityUnavailable {
                capability: (*program).to_string(),
                reason: format!("required by the {tag} stack"),
            }
            .into());
        }

        let root = scaffolder
            .generate(&self.executor, ctx)
            .map_err(|e| match e {
                DevhostError::Application(ApplicationError::CapabilityUnavailable { .. }) => e,
                other => ApplicationError::Scaffold {
                    stack: ctx.stack.to_string(),
                    reason: other.to_string(),
                }
                .into(),
            })?;

        if !self.executor.exists(&ctx.target_dir) {
            self.executor.create_dir_all(&ctx.target_dir)?;
        }
        self.executor
            .write_file(&marker, &format!("stack = \"{}\"\n", ctx.stack))?;
        info!(document_root = %root.display(), "project scaffolded");
        Ok(Applied::changed(&self.executor, root, Vec::new()))
    }
}
