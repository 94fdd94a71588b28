//! Per-invocation run context.
//!
//! Resolved once from flags and environment; nothing is persisted.

use std::path::{Path, PathBuf};

use crate::cluster::docker::DEFAULT_ENDPOINT;
use crate::naming::project_name;
use crate::plan::{BuildOptions, PortPolicy};

/// Compose file looked up when none is given.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Unresolved settings as supplied by a frontend.
#[derive(Debug, Clone, Default)]
pub struct ContextSettings {
    pub project_name: Option<String>,
    pub compose_file: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub port_policy: PortPolicy,
}

/// Everything a command needs to know about this run.
#[derive(Debug, Clone)]
pub struct DeployContext {
    project: String,
    compose_file: PathBuf,
    endpoint: String,
    build_options: BuildOptions,
}

impl DeployContext {
    /// Create a context with explicit values.
    pub fn new(
        project: impl Into<String>,
        compose_file: impl Into<PathBuf>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            compose_file: compose_file.into(),
            endpoint: endpoint.into(),
            build_options: BuildOptions::default(),
        }
    }

    /// Resolve settings relative to `cwd`.
    pub fn resolve(settings: &ContextSettings, cwd: &Path) -> anyhow::Result<Self> {
        let project = project_name(settings.project_name.as_deref(), cwd);
        if project.is_empty() {
            anyhow::bail!(
                "Could not derive a project name from '{}'. Use --project-name.",
                cwd.display()
            );
        }

        let compose_file = settings
            .compose_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPOSE_FILE));
        let compose_file = if compose_file.is_absolute() {
            compose_file
        } else {
            cwd.join(compose_file)
        };

        let endpoint = settings
            .endpoint
            .clone()
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            project,
            compose_file,
            endpoint,
            build_options: BuildOptions {
                port_policy: settings.port_policy,
            },
        })
    }

    /// Resolve settings against the current working directory.
    pub fn with_defaults(settings: &ContextSettings) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::resolve(settings, &cwd)
    }

    pub fn with_port_policy(mut self, port_policy: PortPolicy) -> Self {
        self.build_options.port_policy = port_policy;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_options(&self) -> BuildOptions {
        self.build_options
    }
}
