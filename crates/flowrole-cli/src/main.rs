//! Flowrole CLI - render IAM roles for Prefect agents and flows
//!
//! Documents are written to stdout (or `--out`); logs go to stderr.
//!
//! # Examples
//!
//! ```bash
//! # Agent execution and task policies
//! flowrole --account-id 123456789012 --region us-east-1 agent \
//!     --docker-secret-arn arn:aws:secretsmanager:...:secret:dockerhub \
//!     --app-secret-arn arn:aws:secretsmanager:...:secret:prefect
//!
//! # Flow roles for the `ecs` deployment type
//! flowrole --environment prod flow --bucket-arn arn:aws:s3:::my-bucket --deployment-type ecs
//!
//! # Whole deployment definition as Terraform JSON
//! flowrole render deployment.yaml --format terraform --out iam.tf.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod agent;
mod config;
mod flow;
mod output;
mod render;

/// Flowrole CLI - least-privilege IAM roles for Prefect on ECS
#[derive(Parser)]
#[command(name = "flowrole")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FLOWROLE_CONFIG")]
    #[arg(default_value = "~/.config/flowrole/config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// AWS account id (overrides config)
    #[arg(long, env = "FLOWROLE_ACCOUNT_ID", global = true)]
    account_id: Option<String>,

    /// AWS region (overrides config)
    #[arg(long, env = "FLOWROLE_REGION", global = true)]
    region: Option<String>,

    /// Environment namespace for flow secrets (overrides config)
    #[arg(long, env = "FLOWROLE_ENVIRONMENT", global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the agent's execution and task policies
    Agent(agent::AgentArgs),

    /// Print the execution and task roles for one flow deployment type
    Flow(flow::FlowArgs),

    /// Render every role in a deployment definition file
    Render(render::RenderArgs),

    /// Show current configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowrole=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowrole=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = shellexpand::tilde(&cli.config).to_string();
    info!(config_path = %config_path, "Starting flowrole");

    let config = config::Config::load(&config_path)?.with_overrides(
        cli.account_id,
        cli.region,
        cli.environment,
    );

    match cli.command {
        Commands::Agent(args) => agent::execute(args, &config),
        Commands::Flow(args) => flow::execute(args, &config),
        Commands::Render(args) => render::execute(args, &config),
        Commands::Config => config::show(&config, &config_path),
    }
}
