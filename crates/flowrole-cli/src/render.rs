//! `flowrole render`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flowrole::RecordingProvisioner;
use flowrole_spec::DeploymentSpec;
use tracing::{info, warn};

use crate::config::Config;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Deployment definition (YAML, or JSON with a .json extension)
    pub path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "terraform")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, config: &Config) -> Result<()> {
    let spec = DeploymentSpec::load(&args.path)
        .with_context(|| format!("failed to load deployment {}", args.path.display()))?;

    // The definition carries its own account and environment.
    if let Some(account_id) = config.account.account_id.as_deref() {
        if account_id != spec.spec.account_id {
            warn!(
                config = %account_id,
                definition = %spec.spec.account_id,
                "configured account differs from the deployment definition; using the definition"
            );
        }
    }

    let mut recorder = RecordingProvisioner::new();
    let roles = spec
        .provision(&mut recorder)
        .with_context(|| format!("invalid deployment {}", args.path.display()))?;
    info!(roles = roles.len(), "rendered deployment");

    let value = output::render_roles(&roles, args.format)?;
    output::emit(&value, config.output.pretty, args.out.as_deref())
}
