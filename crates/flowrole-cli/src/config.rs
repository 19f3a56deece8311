//! Configuration handling

use anyhow::{Context, Result};
use flowrole::AccountContext;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration file
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Target account
    #[serde(default)]
    pub account: AccountConfig,

    /// Deployment naming
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AccountConfig {
    /// AWS account id
    #[serde(default)]
    pub account_id: Option<String>,

    /// AWS region
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Environment namespace for flow secrets
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Prefix shared by agent clusters and passable roles
    #[serde(default = "default_cluster_prefix")]
    pub cluster_prefix: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            cluster_prefix: default_cluster_prefix(),
        }
    }
}

fn default_environment() -> String {
    "dev".to_string()
}
fn default_cluster_prefix() -> String {
    "data-flows-prefect".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Indent JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from a file path
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        let path = Path::new(&expanded);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Apply command-line / environment overrides
    pub fn with_overrides(
        mut self,
        account_id: Option<String>,
        region: Option<String>,
        environment: Option<String>,
    ) -> Self {
        if account_id.is_some() {
            self.account.account_id = account_id;
        }
        if region.is_some() {
            self.account.region = region;
        }
        if let Some(environment) = environment {
            self.deployment.environment = environment;
        }
        self
    }

    /// Account context, or an error naming the missing setting
    pub fn account(&self) -> Result<AccountContext> {
        let account_id = self.account.account_id.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "account id not set: pass --account-id, set FLOWROLE_ACCOUNT_ID, or add account_id to [account]"
            )
        })?;
        let region = self.account.region.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "region not set: pass --region, set FLOWROLE_REGION, or add region to [account]"
            )
        })?;
        Ok(AccountContext::new(account_id, region))
    }
}

/// Show current configuration
pub fn show(config: &Config, config_path: &str) -> Result<()> {
    println!("Flowrole Configuration");
    println!("======================");
    println!();
    println!("Config file: {}", config_path);
    println!();

    println!("[account]");
    println!(
        "  account_id = {}",
        config.account.account_id.as_deref().unwrap_or("(unset)")
    );
    println!(
        "  region = {}",
        config.account.region.as_deref().unwrap_or("(unset)")
    );
    println!();

    println!("[deployment]");
    println!("  environment = \"{}\"", config.deployment.environment);
    println!("  cluster_prefix = \"{}\"", config.deployment.cluster_prefix);
    println!();

    println!("[output]");
    println!("  pretty = {}", config.output.pretty);

    Ok(())
}
