//! Terraform JSON output.
//!
//! Roles become `aws_iam_role` resources with the trust policy in
//! `assume_role_policy` and the access policy as a single named
//! `inline_policy` block. Policies are embedded as compact JSON strings, the
//! same form the AWS provider stores in state.
//!
//! ```text
//! {
//!   "resource": {
//!     "aws_iam_role": {
//!       "data_flows_prefect_ecs_task_role": {
//!         "name": "data-flows-prefect-ecs-task-role",
//!         "assume_role_policy": "{\"Version\":...}",
//!         "inline_policy": [{ "name": "...-access-policy", "policy": "{...}" }]
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::info;

use crate::error::{IamError, Result};
use crate::provision::RoleProvisioner;
use crate::role::RoleSpec;

/// A [`RoleProvisioner`] that accumulates a Terraform JSON configuration.
///
/// Resources are keyed by logical id, so output order does not depend on
/// creation order.
#[derive(Debug, Clone, Default)]
pub struct TerraformJson {
    roles: BTreeMap<String, Value>,
}

impl TerraformJson {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Terraform identifier for a role name.
    ///
    /// Characters other than ASCII letters, digits and `_` become `_`; a
    /// leading digit gets a `role_` prefix.
    pub fn logical_id(role_name: &str) -> String {
        let id: String = role_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if id.starts_with(|c: char| c.is_ascii_digit()) || id.is_empty() {
            format!("role_{}", id)
        } else {
            id
        }
    }

    /// Number of role resources.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether no role has been added.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The role resource stored under `logical_id`.
    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.roles.get(logical_id)
    }

    /// The full configuration.
    pub fn to_value(&self) -> Value {
        json!({ "resource": { "aws_iam_role": self.roles } })
    }

    /// The full configuration as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    fn role_resource(role: &RoleSpec) -> Result<Value> {
        Ok(json!({
            "name": role.name(),
            "assume_role_policy": role.trust_document().to_json()?,
            "inline_policy": [{
                "name": role.inline_policy_name(),
                "policy": role.access_document().to_json()?,
            }],
        }))
    }
}

impl RoleProvisioner for TerraformJson {
    fn create_role(&mut self, role: &RoleSpec) -> Result<()> {
        let id = Self::logical_id(role.name());
        if self.roles.contains_key(&id) {
            return Err(IamError::DuplicateRole {
                name: role.name().to_string(),
                logical_id: id,
            });
        }
        let resource = Self::role_resource(role)?;
        info!(role = %role.name(), logical_id = %id, "rendered aws_iam_role");
        self.roles.insert(id, resource);
        Ok(())
    }
}
