//! `flowrole flow`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use flowrole::{FlowRoleBuilder, RecordingProvisioner};

use crate::config::Config;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct FlowArgs {
    /// Flow storage bucket ARN
    #[arg(long)]
    pub bucket_arn: String,

    /// Deployment-type label used in role names
    #[arg(long, default_value = "ecs")]
    pub deployment_type: String,

    /// Output format
    #[arg(long, value_enum, default_value = "policies")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: FlowArgs, config: &Config) -> Result<()> {
    let account = config.account()?;
    let builder = FlowRoleBuilder::new(
        args.bucket_arn,
        account,
        config.deployment.environment.clone(),
        args.deployment_type,
    );

    let mut recorder = RecordingProvisioner::new();
    builder.build(&mut recorder)?;

    let value = output::render_roles(recorder.roles(), args.format)?;
    output::emit(&value, config.output.pretty, args.out.as_deref())
}
