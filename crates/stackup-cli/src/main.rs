//! Stackup - deploy compose applications to swarm-mode clusters
//!
//! Usage:
//!   stackup up        # Create networks and services
//!   stackup down      # Remove services and owned networks
//!   stackup config    # Print the resolved plan

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stackup_core::cluster::DockerClient;
use stackup_core::commands::{ConfigCommand, DownCommand, UpCommand};
use stackup_core::context::{ContextSettings, DeployContext};
use stackup_core::deploy::{DownReport, NetworkOutcome, UpReport};
use stackup_core::plan::PortPolicy;

#[derive(Parser)]
#[command(name = "stackup")]
#[command(
    about = "Deploy services defined in a compose file to swarm-mode clusters",
    long_about = None
)]
struct Cli {
    /// Specify an alternate project name (default: directory name)
    #[arg(short = 'p', long, env = "STACKUP_PROJECT_NAME", global = true)]
    project_name: Option<String>,

    /// Specify an alternate compose file
    #[arg(
        short = 'f',
        long = "file",
        env = "STACKUP_FILE",
        default_value = "docker-compose.yml",
        global = true
    )]
    file: PathBuf,

    /// Docker engine endpoint of a swarm manager (tcp://, http:// or https://)
    #[arg(short = 'H', long, env = "DOCKER_HOST", global = true)]
    host: Option<String>,

    /// Treat malformed port specs as 0 instead of failing
    #[arg(long, global = true)]
    lenient_ports: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and start services
    Up,

    /// Remove services and the networks this project owns
    Down,

    /// Validate the compose file and print the resolved plan
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "stackup=debug,stackup_core=debug,info"
    } else {
        "stackup=info,stackup_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ContextSettings {
        project_name: cli.project_name,
        compose_file: Some(cli.file),
        endpoint: cli.host,
        port_policy: if cli.lenient_ports {
            PortPolicy::Lenient
        } else {
            PortPolicy::Strict
        },
    };
    let ctx = DeployContext::with_defaults(&settings)?;

    match cli.command {
        Commands::Up => run_up(ctx),
        Commands::Down => run_down(ctx),
        Commands::Config => run_config(ctx),
    }
}

fn connect(ctx: &DeployContext) -> Result<DockerClient> {
    let client = DockerClient::new(ctx.endpoint())?;
    tracing::debug!(endpoint = %client.base_url(), "Using cluster endpoint");
    Ok(client)
}

fn run_up(ctx: DeployContext) -> Result<()> {
    let client = connect(&ctx)?;
    let report = UpCommand::new(ctx).execute(&client)?;
    print_up_report(&report);
    Ok(())
}

fn run_down(ctx: DeployContext) -> Result<()> {
    let client = connect(&ctx)?;
    let report = DownCommand::new(ctx).execute(&client)?;
    print_down_report(&report);
    Ok(())
}

fn run_config(ctx: DeployContext) -> Result<()> {
    let rendered = ConfigCommand::new(ctx).render()?;
    println!("{rendered}");
    Ok(())
}

fn print_up_report(report: &UpReport) {
    for network in &report.networks {
        match &network.outcome {
            NetworkOutcome::Created { .. } => println!("Network {}: created", network.real_name),
            NetworkOutcome::Existing => println!("Network {}: exists", network.real_name),
            NetworkOutcome::ExternalPresent => {
                println!("Network {}: external, present", network.real_name)
            }
            NetworkOutcome::Failed => println!("Network {}: failed", network.real_name),
        }
    }
    for service in &report.services {
        println!("Service {}: created ({})", service.real_name, service.id);
    }
    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }
}

fn print_down_report(report: &DownReport) {
    for name in &report.removed_services {
        println!("Service {name}: removed");
    }
    for name in &report.removed_networks {
        println!("Network {name}: removed");
    }
    for name in &report.skipped_external {
        println!("Network {name}: external, kept");
    }
    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }
}
