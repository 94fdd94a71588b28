//! Down command: remove services, then owned networks.

use tracing::info;

use crate::cluster::ClusterClient;
use crate::commands::load_plan;
use crate::context::DeployContext;
use crate::deploy::{DownReport, Reconciler};

#[derive(Debug)]
pub struct DownCommand {
    ctx: DeployContext,
}

impl DownCommand {
    pub fn new(ctx: DeployContext) -> Self {
        Self { ctx }
    }

    /// Build the plan from the same compose input and tear it down.
    ///
    /// Only loading or planning can fail; removal failures are collected in
    /// the report.
    pub fn execute<C: ClusterClient>(&self, client: C) -> anyhow::Result<DownReport> {
        let plan = load_plan(&self.ctx)?;
        let report = Reconciler::new(client).down(&plan);
        info!(
            project = %plan.project,
            removed_services = report.removed_services.len(),
            removed_networks = report.removed_networks.len(),
            failures = report.failures.len(),
            "Down complete"
        );
        Ok(report)
    }
}
