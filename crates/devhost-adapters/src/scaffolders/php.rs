use std::path::PathBuf;

use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CommandSpec, ScaffoldContext, Scaffolder},
    },
    domain::StackTag,
    error::DevhostResult,
};

use super::{ensure_dir, split_target};

/// `composer create-project laravel/laravel`. Served from `public/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaravelScaffolder;

impl Scaffolder for LaravelScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::FrameworkPhp
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        let (parent, dir_name) = split_target(&ctx.target_dir)?;
        ensure_dir(exec, parent)?;
        exec.run(
            &CommandSpec::new("composer")
                .args(["create-project", "--no-interaction", "laravel/laravel"])
                .arg(dir_name)
                .cwd(parent),
        )?;
        Ok(self.document_root(&ctx.target_dir))
    }
}

/// WordPress core via WP-CLI. Served from the project directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordpressScaffolder;

impl Scaffolder for WordpressScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::Cms
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        ensure_dir(exec, &ctx.target_dir)?;
        exec.run(
            &CommandSpec::new("wp")
                .args(["core", "download"])
                .arg(format!("--path={}", ctx.target_dir.display())),
        )?;
        Ok(self.document_root(&ctx.target_dir))
    }
}
