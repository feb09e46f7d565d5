use std::path::PathBuf;

use devhost_core::{
    application::{
        ActionExecutor, ApplicationError,
        ports::{CommandSpec, ScaffoldContext, Scaffolder},
    },
    domain::{StackKind, StackTag},
    error::DevhostResult,
};
use serde_json::Value;

use super::{ensure_dir, split_target, wrong_stack};

/// `npm create vite@latest <name> -- --template <variant>`, then the dev and
/// preview scripts are pinned to the assigned port.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViteScaffolder;

impl ViteScaffolder {
    /// Rewrite `package.json` so `npm run dev` binds 127.0.0.1:`port` and
    /// exits instead of drifting to the next free port.
    fn pin_port(manifest: &str, port: u16) -> Result<String, ApplicationError> {
        let invalid = |reason: String| ApplicationError::Scaffold {
            stack: "node-spa".into(),
            reason: format!("package.json: {reason}"),
        };
        let mut manifest: Value =
            serde_json::from_str(manifest).map_err(|e| invalid(e.to_string()))?;
        let root = manifest
            .as_object_mut()
            .ok_or_else(|| invalid("not a JSON object".into()))?;
        let scripts = root
            .entry("scripts")
            .or_insert_with(|| Value::Object(Default::default()))
            .as_object_mut()
            .ok_or_else(|| invalid("\"scripts\" is not an object".into()))?;

        let flags = format!("--host 127.0.0.1 --port {port} --strictPort");
        scripts.insert("dev".into(), Value::String(format!("vite {flags}")));
        scripts.insert("preview".into(), Value::String(format!("vite preview {flags}")));

        let mut rendered =
            serde_json::to_string_pretty(&manifest).map_err(|e| invalid(e.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

impl Scaffolder for ViteScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::NodeSpa
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        let StackKind::NodeSpa(variant) = ctx.stack else {
            return Err(wrong_stack("node-spa", ctx.stack).into());
        };
        let (parent, dir_name) = split_target(&ctx.target_dir)?;
        ensure_dir(exec, parent)?;
        exec.run(
            &CommandSpec::new("npm")
                .args(["create", "vite@latest"])
                .arg(dir_name)
                .args(["--", "--template", variant.as_str()])
                .cwd(parent),
        )?;

        let manifest = ctx.target_dir.join("package.json");
        if exec.exists(&manifest) {
            let pinned = Self::pin_port(&exec.read_to_string(&manifest)?, ctx.port)?;
            exec.write_file(&manifest, &pinned)?;
        } else if !exec.is_dry_run() {
            return Err(ApplicationError::Scaffold {
                stack: ctx.stack.to_string(),
                reason: format!("{} was not generated", manifest.display()),
            }
            .into());
        }
        Ok(self.document_root(&ctx.target_dir))
    }
}

/// Dependency-free HTTP server listening on the assigned port.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeServerScaffolder;

impl NodeServerScaffolder {
    fn package_json(name: &str) -> String {
        format!(
            "{{\n  \"name\": \"{}\",\n  \"version\": \"0.1.0\",\n  \"private\": true,\n  \
             \"main\": \"server.js\",\n  \"scripts\": {{\n    \"start\": \"node server.js\"\n  }}\n}}\n",
            name.to_ascii_lowercase()
        )
    }

    fn server_js(port: u16) -> String {
        format!(
            "const http = require('http');\n\
             const fs = require('fs');\n\
             const path = require('path');\n\
             \n\
             const port = process.env.PORT || {port};\n\
             const index = path.join(__dirname, 'public', 'index.html');\n\
             \n\
             http.createServer((req, res) => {{\n\
             \x20 fs.readFile(index, (err, body) => {{\n\
             \x20   if (err) {{\n\
             \x20     res.writeHead(500);\n\
             \x20     res.end('index.html missing');\n\
             \x20     return;\n\
             \x20   }}\n\
             \x20   res.writeHead(200, {{ 'Content-Type': 'text/html' }});\n\
             \x20   res.end(body);\n\
             \x20 }});\n\
             }}).listen(port, '127.0.0.1', () => {{\n\
             \x20 console.log(`listening on http://127.0.0.1:${{port}}`);\n\
             }});\n"
        )
    }
}

impl Scaffolder for NodeServerScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::NodeServer
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        let dir = &ctx.target_dir;
        let public = self.document_root(dir);
        ensure_dir(exec, &public)?;
        exec.write_file(&dir.join("package.json"), &Self::package_json(&ctx.name))?;
        exec.write_file(&dir.join("server.js"), &Self::server_js(ctx.port))?;
        exec.write_file(
            &public.join("index.html"),
            &format!("<!DOCTYPE html>\n<h1>{}</h1>\n", ctx.name),
        )?;
        Ok(public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_listens_on_assigned_port() {
        let js = NodeServerScaffolder::server_js(3007);
        assert!(js.contains("process.env.PORT || 3007"));
        assert!(js.contains("listen(port, '127.0.0.1'"));
    }

    #[test]
    fn vite_scripts_are_pinned_to_assigned_port() {
        let generated = r#"{
  "name": "app",
  "private": true,
  "scripts": { "dev": "vite", "build": "vite build", "preview": "vite preview" }
}"#;
        let pinned = ViteScaffolder::pin_port(generated, 3004).unwrap();
        let manifest: Value = serde_json::from_str(&pinned).unwrap();

        assert_eq!(
            manifest["scripts"]["dev"],
            "vite --host 127.0.0.1 --port 3004 --strictPort"
        );
        assert_eq!(
            manifest["scripts"]["preview"],
            "vite preview --host 127.0.0.1 --port 3004 --strictPort"
        );
        assert_eq!(manifest["scripts"]["build"], "vite build");
        assert_eq!(manifest["name"], "app");
    }

    #[test]
    fn vite_manifest_without_scripts_gains_them() {
        let pinned = ViteScaffolder::pin_port(r#"{"name":"app"}"#, 5173).unwrap();
        assert!(pinned.contains("--port 5173 --strictPort"));
        assert!(ViteScaffolder::pin_port("[]", 5173).is_err());
    }

    #[test]
    fn package_name_is_lowercase() {
        assert!(NodeServerScaffolder::package_json("MyApi").contains("\"name\": \"myapi\""));
    }
}
