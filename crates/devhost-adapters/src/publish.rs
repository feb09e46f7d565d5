//! GitHub repository publisher.
//!
//! The repository is created through the REST API with `GITHUB_TOKEN`, then
//! the project is committed and pushed with the git CLI. The token reaches
//! git through `GIT_CONFIG_*` environment variables, never argv.

use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use tracing::{info, instrument};

use devhost_core::{
    application::{
        ActionExecutor, ApplicationError, Execution,
        ports::{CommandSpec, RepositoryPublisher},
    },
    domain::Secret,
    error::{DevhostError, DevhostResult},
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("devhost/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CreatedRepository {
    html_url: String,
    clone_url: String,
}

pub struct GithubPublisher {
    token: Secret,
    api_url: String,
}

impl GithubPublisher {
    pub fn new(token: Secret) -> Self {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    pub fn with_api_url(token: Secret, api_url: impl Into<String>) -> Self {
        Self {
            token,
            api_url: api_url.into(),
        }
    }

    /// Token from `GITHUB_TOKEN`; `None` when unset or empty.
    pub fn from_env() -> Option<Self> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(|token| Self::new(Secret::new(token.trim())))
    }

    fn create_repository(&self, name: &str, private: bool) -> DevhostResult<CreatedRepository> {
        let failure = |reason: String| -> DevhostError {
            ApplicationError::Publish {
                repository: name.to_string(),
                reason,
            }
            .into()
        };

        let response = ureq::post(&format!("{}/user/repos", self.api_url))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT)
            .set("Authorization", &format!("Bearer {}", self.token.expose()))
            .send_json(serde_json::json!({ "name": name, "private": private }));

        match response {
            Ok(resp) => resp
                .into_json::<CreatedRepository>()
                .map_err(|e| failure(format!("unreadable API response: {e}"))),
            Err(ureq::Error::Status(401, _)) => Err(failure("GITHUB_TOKEN was rejected".into())),
            Err(ureq::Error::Status(422, _)) => {
                Err(failure("a repository with this name already exists".into()))
            }
            Err(ureq::Error::Status(code, _)) => Err(failure(format!("GitHub API returned HTTP {code}"))),
            Err(e) => Err(failure(format!("network error: {e}"))),
        }
    }

    /// `git push` with the token supplied as an HTTP header via environment.
    fn authenticated(&self, command: CommandSpec) -> CommandSpec {
        let basic = STANDARD.encode(format!("x-access-token:{}", self.token.expose()));
        command
            .env("GIT_CONFIG_COUNT", Secret::new("1"))
            .env("GIT_CONFIG_KEY_0", Secret::new("http.https://github.com/.extraheader"))
            .env(
                "GIT_CONFIG_VALUE_0",
                Secret::new(format!("AUTHORIZATION: basic {basic}")),
            )
    }
}

fn git(project_dir: &Path) -> CommandSpec {
    CommandSpec::new("git").cwd(project_dir)
}

impl RepositoryPublisher for GithubPublisher {
    #[instrument(skip(self, exec, project_dir))]
    fn publish(
        &self,
        exec: &ActionExecutor,
        project_dir: &Path,
        name: &str,
        private: bool,
    ) -> DevhostResult<String> {
        if !exec.program_exists("git") {
            return Err(ApplicationError::CapabilityUnavailable {
                capability: "git".into(),
                reason: "required to push the project".into(),
            }
            .into());
        }

        let created = exec.execute(format!("create GitHub repository {name}"), || {
            self.create_repository(name, private)
        })?;
        let (html_url, clone_url) = match created {
            Execution::Performed(repo) => (repo.html_url, repo.clone_url),
            Execution::Simulated => (
                format!("https://github.com/<owner>/{name}"),
                format!("https://github.com/<owner>/{name}.git"),
            ),
        };

        if !exec.exists(&project_dir.join(".git")) {
            exec.run(&git(project_dir).args(["init", "-b", "main"]))?;
        }
        exec.run(&git(project_dir).args(["add", "-A"]))?;
        let pending = exec.query(&git(project_dir).args(["status", "--porcelain"]))?;
        if !pending.stdout.trim().is_empty() || !exec.exists(&project_dir.join(".git")) {
            exec.run(&git(project_dir).args(["commit", "-m", "Initial commit"]))?;
        }

        let has_origin = exec
            .query(&git(project_dir).args(["remote", "get-url", "origin"]))
            .is_ok_and(|out| out.is_success());
        if has_origin {
            exec.run(&git(project_dir).args(["remote", "set-url", "origin", clone_url.as_str()]))?;
        } else {
            exec.run(&git(project_dir).args(["remote", "add", "origin", clone_url.as_str()]))?;
        }
        exec.run(&self.authenticated(git(project_dir).args(["push", "-u", "origin", "HEAD:main"])))?;

        info!(url = %html_url, "project published");
        Ok(html_url)
    }
}
