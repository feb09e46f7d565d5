use std::path::PathBuf;

use devhost_core::{
    application::{
        ActionExecutor,
        ports::{ScaffoldContext, Scaffolder},
    },
    domain::StackTag,
    error::DevhostResult,
};

use super::ensure_dir;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js";

/// `index.html` naming the project.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSiteScaffolder;

impl Scaffolder for StaticSiteScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::Static
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        ensure_dir(exec, &ctx.target_dir)?;
        let page = format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n  <meta charset=\"utf-8\">\n  <title>{name}</title>\n</head>\n\
             <body>\n  <h1>{name}</h1>\n  <p>Served locally by devhost.</p>\n</body>\n\
             </html>\n",
            name = ctx.name
        );
        exec.write_file(&ctx.target_dir.join("index.html"), &page)?;
        Ok(self.document_root(&ctx.target_dir))
    }
}

/// `index.html` pulling Bootstrap from the CDN, plus local `css/` and `js/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapSiteScaffolder;

impl Scaffolder for BootstrapSiteScaffolder {
    fn tag(&self) -> StackTag {
        StackTag::StaticBootstrap
    }

    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf> {
        let dir = &ctx.target_dir;
        ensure_dir(exec, &dir.join("css"))?;
        ensure_dir(exec, &dir.join("js"))?;

        let page = format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             \x20 <meta charset=\"utf-8\">\n\
             \x20 <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             \x20 <title>{name}</title>\n\
             \x20 <link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">\n\
             \x20 <link rel=\"stylesheet\" href=\"css/site.css\">\n\
             </head>\n\
             <body>\n\
             \x20 <main class=\"container py-5\">\n\
             \x20   <h1 class=\"display-5\">{name}</h1>\n\
             \x20   <p class=\"lead\">Served locally by devhost.</p>\n\
             \x20 </main>\n\
             \x20 <script src=\"{BOOTSTRAP_JS}\"></script>\n\
             \x20 <script src=\"js/site.js\"></script>\n\
             </body>\n\
             </html>\n",
            name = ctx.name
        );
        exec.write_file(&dir.join("index.html"), &page)?;
        exec.write_file(&dir.join("css/site.css"), "/* Site styles */\n")?;
        exec.write_file(&dir.join("js/site.js"), "// Site scripts\n")?;
        Ok(self.document_root(dir))
    }
}
