//! High-level commands for stackup operations.
//!
//! Each command loads the compose document named by the context, builds a
//! fresh plan and, for `up`/`down`, hands it to the reconciler. Plans are
//! never read back from the cluster.

pub mod config;
pub mod down;
pub mod up;

use anyhow::Context;
use tracing::{debug, warn};

use crate::app::load_compose;
use crate::context::DeployContext;
use crate::plan::{DeploymentPlan, PlanBuilder};

pub use config::ConfigCommand;
pub use down::DownCommand;
pub use up::UpCommand;

/// Load the compose document and build the plan for this run.
pub fn load_plan(ctx: &DeployContext) -> anyhow::Result<DeploymentPlan> {
    let app = load_compose(ctx.compose_file())?;
    let plan = PlanBuilder::new(ctx.project())
        .with_options(ctx.build_options())
        .build(&app)
        .with_context(|| format!("Failed to plan project '{}'", ctx.project()))?;

    for warning in &plan.warnings {
        warn!("{}", warning);
    }
    debug!(
        project = %plan.project,
        networks = plan.networks.len(),
        services = plan.services.len(),
        "Plan built"
    );
    Ok(plan)
}
