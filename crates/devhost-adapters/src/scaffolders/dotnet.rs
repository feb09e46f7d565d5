use std::path::{Path, PathBuf};

use devhost_core::{
    application::{
        ActionExecutor, ApplicationError,
        ports::{CommandSpec, ScaffoldContext, Scaffolder},
    },
    domain::{StackKind, StackTag},
    error::DevhostResult,
};
use serde_json::{Map, Value, json};

use super::{ensure_dir, wrong_stack};

/// `dotnet new <template> -o <dir>`, with the launch profile bound to the
/// assigned port.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotnetScaffolder;

impl DotnetScaffolder {
    fn launch_settings_path(target_dir: &Path) -> PathBuf {
        target_dir.join("Properties").join("launchSettings.json")
    }

    /// A single `dotnet run` profile serving http://127.0.0.1:`port`. Replaces
    /// the generated file, whose ports are random.
    fn launch_settings(name: &str, port: u16) -> Result<String, ApplicationError> {
        let url = format!("http://127.0.0.1:{port}");
        let mut profiles = Map::new();
        profiles.insert(
            name.to_string(),
            json!({
                "commandName": "Project",
                "launchBrowser": false,
                "applicationUrl": url,
                "environmentVariables": {
                    "ASPNETCORE_ENVIRONMENT": "Development",
                    "ASPNETCORE_URLS": url,
                },
            }),
        );
        let settings = json!({ "profiles": Value::Object(profiles) });

        let mut rendered =
            serde_json::to_string_pretty(&settings).map_err(|e| ApplicationError::Scaffold {
                stack: "dotnet-app".into(),
                reason: format!("launchSettings.json: {e}"),
            })?;
        rendered.push('\n');
        Ok(rendered)
    }
}

impl Scaffolder for DotnetScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::DotnetApp
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        let StackKind::DotnetApp(template) = ctx.stack else {
            return Err(wrong_stack("dotnet-app", ctx.stack).into());
        };
        exec.run(
            &CommandSpec::new("dotnet")
                .args(["new", template.as_str(), "-o"])
                .arg(ctx.target_dir.display().to_string())
                .args(["--name", ctx.name.as_str()]),
        )?;

        let settings = Self::launch_settings_path(&ctx.target_dir);
        if let Some(properties) = settings.parent() {
            ensure_dir(exec, properties)?;
        }
        exec.write_file(&settings, &Self::launch_settings(&ctx.name, ctx.port)?)?;
        Ok(self.document_root(&ctx.target_dir))
    }
}
