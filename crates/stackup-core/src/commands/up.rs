//! Up command: create networks, then services.

use tracing::info;

use crate::cluster::ClusterClient;
use crate::commands::load_plan;
use crate::context::DeployContext;
use crate::deploy::{Reconciler, UpReport};

#[derive(Debug)]
pub struct UpCommand {
    ctx: DeployContext,
}

impl UpCommand {
    pub fn new(ctx: DeployContext) -> Self {
        Self { ctx }
    }

    /// Build the plan and apply it.
    ///
    /// Fails on the first fatal error: an invalid plan, a missing external
    /// network, or a service the cluster refuses to create.
    pub fn execute<C: ClusterClient>(&self, client: C) -> anyhow::Result<UpReport> {
        let plan = load_plan(&self.ctx)?;
        let report = Reconciler::new(client).up(&plan)?;
        info!(
            project = %plan.project,
            services = report.services.len(),
            failures = report.failures.len(),
            "Up complete"
        );
        Ok(report)
    }
}
