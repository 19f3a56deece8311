//! Output formatting shared by the commands.

use std::path::Path;

use anyhow::{Context, Result};
use flowrole::{RoleProvisioner, RoleSpec, TerraformJson};
use serde_json::{json, Value};

/// Shape of the emitted JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Policy documents per role
    Policies,
    /// Terraform JSON `aws_iam_role` resources
    Terraform,
}

/// Role documents as JSON objects, with a digest of each access policy.
pub fn roles_value(roles: &[RoleSpec]) -> Result<Value> {
    let mut out = Vec::with_capacity(roles.len());
    for role in roles {
        let access = role.access_document();
        out.push(json!({
            "name": role.name(),
            "assume_role_policy": role.trust_document(),
            "inline_policy": {
                "name": role.inline_policy_name(),
                "policy": access,
                "sha256": access.sha256_hex()?,
            },
        }));
    }
    Ok(Value::Array(out))
}

/// Render roles in the requested format.
pub fn render_roles(roles: &[RoleSpec], format: OutputFormat) -> Result<Value> {
    match format {
        OutputFormat::Policies => roles_value(roles),
        OutputFormat::Terraform => {
            let mut tf = TerraformJson::new();
            for role in roles {
                tf.create_role(role)?;
            }
            Ok(tf.to_value())
        }
    }
}

/// Write `value` to `out`, or stdout when no path is given.
pub fn emit(value: &Value, pretty: bool, out: Option<&Path>) -> Result<()> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');

    match out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => print!("{}", text),
    }
    Ok(())
}
