//! Resolve and print the deployment plan without touching the cluster.

use crate::commands::load_plan;
use crate::context::DeployContext;
use crate::plan::DeploymentPlan;

#[derive(Debug)]
pub struct ConfigCommand {
    ctx: DeployContext,
}

impl ConfigCommand {
    pub fn new(ctx: DeployContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> anyhow::Result<DeploymentPlan> {
        load_plan(&self.ctx)
    }

    /// The plan as pretty-printed JSON.
    pub fn render(&self) -> anyhow::Result<String> {
        let plan = self.execute()?;
        Ok(serde_json::to_string_pretty(&plan)?)
    }
}
