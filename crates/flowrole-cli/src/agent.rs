//! `flowrole agent`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use flowrole::{AgentPolicyBuilder, PolicyDocument};
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Secret holding the container registry credentials
    #[arg(long)]
    pub docker_secret_arn: String,

    /// Secret holding the Prefect API settings
    #[arg(long)]
    pub app_secret_arn: String,

    /// ECS cluster/role name prefix (defaults to config)
    #[arg(long)]
    pub cluster_prefix: Option<String>,

    /// Print bare statement sets, or the agent roles
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: AgentArgs, config: &Config) -> Result<()> {
    let account = config.account()?;
    let cluster_prefix = args
        .cluster_prefix
        .unwrap_or_else(|| config.deployment.cluster_prefix.clone());
    info!(account = %account, cluster_prefix = %cluster_prefix, "building agent policies");

    let builder = AgentPolicyBuilder::new(
        args.docker_secret_arn,
        args.app_secret_arn,
        cluster_prefix,
        account,
    );

    let value = match args.format {
        None => {
            let policies = builder.build();
            json!({
                "execution": PolicyDocument::new(policies.execution),
                "task": PolicyDocument::new(policies.task),
            })
        }
        Some(format) => {
            let roles = builder.roles();
            output::render_roles(&[roles.execution, roles.task], format)?
        }
    };

    output::emit(&value, config.output.pretty, args.out.as_deref())
}
