//! Deployment definitions shared by the flowrole CLI and library users.
//!
//! A deployment definition names the account, region and environment once and
//! lists the agent and flow deployments that need roles:
//!
//! ```yaml
//! apiVersion: flowrole/v1
//! kind: Deployment
//! metadata:
//!   name: data-flows
//! spec:
//!   account_id: "123456789012"
//!   region: us-east-1
//!   environment: prod
//!   agent:
//!     docker_secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:dockerhub
//!     app_secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:prefect
//!   flows:
//!     - deployment_type: ecs
//!       bucket_arn: arn:aws:s3:::my-bucket
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use flowrole::{
    AccountContext, AgentPolicyBuilder, FlowRoleBuilder, IamError, RoleProvisioner, RoleSpec,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// API version this crate understands.
pub const API_VERSION: &str = "flowrole/v1";

/// Document kind this crate understands.
pub const KIND: &str = "Deployment";

/// Top-level deployment definition (YAML/JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// API version for the definition.
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    /// Kind of the definition (should be "Deployment").
    pub kind: String,
    /// Metadata about the deployment.
    #[serde(default)]
    pub metadata: Metadata,
    /// Deployment contents.
    pub spec: DeploymentSpecInner,
}

/// Metadata for a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Optional deployment name.
    pub name: Option<String>,
    /// Optional labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Inner spec fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpecInner {
    /// Target account id.
    pub account_id: String,
    /// Target region.
    pub region: String,
    /// Environment namespace for flow secrets (`dpt/<environment>/...`).
    pub environment: String,
    /// Optional Prefect agent.
    #[serde(default)]
    pub agent: Option<AgentSpec>,
    /// Flow deployments, one role pair each.
    #[serde(default)]
    pub flows: Vec<FlowSpec>,
}

/// Inputs for the agent's policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Registry credentials secret.
    pub docker_secret_arn: String,
    /// Prefect API secret.
    pub app_secret_arn: String,
    /// Prefix shared by the agent's clusters and passable roles.
    #[serde(default = "default_cluster_prefix")]
    pub cluster_prefix: String,
}

/// Inputs for one flow deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSpec {
    /// Deployment-type label used in role names (e.g. `ecs`).
    pub deployment_type: String,
    /// Flow storage bucket.
    pub bucket_arn: String,
}

fn default_cluster_prefix() -> String {
    "data-flows-prefect".to_string()
}

impl DeploymentSpec {
    /// Create a definition with defaults for version and kind.
    pub fn new(spec: DeploymentSpecInner) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: Metadata::default(),
            spec,
        }
    }

    /// Parse a YAML definition.
    pub fn from_yaml(yaml: &str) -> Result<Self, SpecError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON definition.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a definition from disk. `.json` files are parsed as JSON,
    /// anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Check version, kind and required fields.
    ///
    /// ARNs are not inspected; they are passed to the builders as given.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.api_version != API_VERSION {
            return Err(SpecError::Validation(format!(
                "unsupported apiVersion '{}', expected '{}'",
                self.api_version, API_VERSION
            )));
        }
        if self.kind != KIND {
            return Err(SpecError::Validation(format!(
                "unsupported kind '{}', expected '{}'",
                self.kind, KIND
            )));
        }
        let inner = &self.spec;
        for (field, value) in [
            ("account_id", &inner.account_id),
            ("region", &inner.region),
            ("environment", &inner.environment),
        ] {
            if value.trim().is_empty() {
                return Err(SpecError::Validation(format!("spec.{} must not be empty", field)));
            }
        }
        // The prefix scopes PassRole and the cluster condition; empty means every role.
        if let Some(agent) = &inner.agent {
            if agent.cluster_prefix.trim().is_empty() {
                return Err(SpecError::Validation(
                    "agent cluster_prefix must not be empty".to_string(),
                ));
            }
        }
        let mut seen = HashSet::new();
        for flow in &inner.flows {
            if flow.deployment_type.trim().is_empty() {
                return Err(SpecError::Validation(
                    "flow deployment_type must not be empty".to_string(),
                ));
            }
            if !seen.insert(flow.deployment_type.as_str()) {
                return Err(SpecError::Validation(format!(
                    "duplicate flow deployment_type '{}'",
                    flow.deployment_type
                )));
            }
        }
        let mut names = HashSet::new();
        let agent_names = self.agent_builder().map(|agent| {
            let (execution, task) = agent.role_names();
            [execution, task]
        });
        let flow_names = self
            .flow_builders()
            .into_iter()
            .map(|flow| [flow.execution_role_name(), flow.task_role_name()]);
        for name in agent_names.into_iter().chain(flow_names).flatten() {
            if !names.insert(name.clone()) {
                return Err(SpecError::Validation(format!(
                    "role name '{}' is produced more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Account context for the builders.
    pub fn account(&self) -> AccountContext {
        AccountContext::new(&self.spec.account_id, &self.spec.region)
    }

    /// Builder for the agent, if one is declared.
    pub fn agent_builder(&self) -> Option<AgentPolicyBuilder> {
        self.spec.agent.as_ref().map(|agent| {
            AgentPolicyBuilder::new(
                &agent.docker_secret_arn,
                &agent.app_secret_arn,
                &agent.cluster_prefix,
                self.account(),
            )
        })
    }

    /// Builders for each flow, in declaration order.
    pub fn flow_builders(&self) -> Vec<FlowRoleBuilder> {
        self.spec
            .flows
            .iter()
            .map(|flow| {
                FlowRoleBuilder::new(
                    &flow.bucket_arn,
                    self.account(),
                    &self.spec.environment,
                    &flow.deployment_type,
                )
            })
            .collect()
    }

    /// Validate, then hand every role to `provisioner`: agent roles first,
    /// then each flow's roles in declaration order.
    pub fn provision<P: RoleProvisioner + ?Sized>(
        &self,
        provisioner: &mut P,
    ) -> Result<Vec<RoleSpec>, SpecError> {
        self.validate()?;
        let mut created = Vec::new();
        if let Some(agent) = self.agent_builder() {
            let roles = agent.provision(provisioner)?;
            created.extend([roles.execution, roles.task]);
        }
        for flow in self.flow_builders() {
            let roles = flow.build(provisioner)?;
            created.extend([roles.execution, roles.task]);
        }
        debug!(
            deployment = self.metadata.name.as_deref().unwrap_or("<unnamed>"),
            roles = created.len(),
            "provisioned deployment roles"
        );
        Ok(created)
    }
}

/// Errors loading or resolving a deployment definition.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The definition file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The definition parsed but is not usable.
    #[error("validation error: {0}")]
    Validation(String),
    /// Rendering or provisioning failed.
    #[error(transparent)]
    Iam(#[from] IamError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowrole::{RecordingProvisioner, TerraformJson};
    use std::io::Write;
    use tempfile::Builder;

    const FULL: &str = r#"
apiVersion: flowrole/v1
kind: Deployment
metadata:
  name: data-flows
spec:
  account_id: "123456789012"
  region: us-east-1
  environment: prod
  agent:
    docker_secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:dockerhub
    app_secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:prefect
  flows:
    - deployment_type: ecs
      bucket_arn: arn:aws:s3:::my-bucket
    - deployment_type: ecs-gpu
      bucket_arn: arn:aws:s3:::my-bucket
"#;

    const FLOWS_ONLY: &str = r#"
apiVersion: flowrole/v1
kind: Deployment
spec:
  account_id: "123456789012"
  region: eu-west-1
  environment: dev
  flows:
    - deployment_type: ecs
      bucket_arn: arn:aws:s3:::dev-bucket
"#;

    #[test]
    fn test_full_definition_parses() {
        let spec = DeploymentSpec::from_yaml(FULL).expect("should parse");
        assert_eq!(spec.metadata.name.as_deref(), Some("data-flows"));
        assert_eq!(spec.spec.flows.len(), 2);
        let agent = spec.spec.agent.as_ref().unwrap();
        // cluster_prefix falls back to the default
        assert_eq!(agent.cluster_prefix, "data-flows-prefect");
        spec.validate().unwrap();
    }

    #[test]
    fn test_account_id_stays_a_string() {
        let spec = DeploymentSpec::from_yaml(FULL).unwrap();
        assert_eq!(spec.account().account_id, "123456789012");
        assert_eq!(spec.account().region, "us-east-1");
    }

    #[test]
    fn test_flows_only_definition() {
        let spec = DeploymentSpec::from_yaml(FLOWS_ONLY).unwrap();
        assert!(spec.spec.agent.is_none());
        assert!(spec.agent_builder().is_none());
        assert!(spec.metadata.name.is_none());

        let mut recorder = RecordingProvisioner::new();
        let roles = spec.provision(&mut recorder).unwrap();
        let names: Vec<&str> = roles.iter().map(RoleSpec::name).collect();
        assert_eq!(
            names,
            vec!["data-flows-prefect-ecs-exec-role", "data-flows-prefect-ecs-task-role"]
        );
        assert_eq!(
            roles[0].inline_policy()[0].resources(),
            ["arn:aws:secretsmanager:eu-west-1:123456789012:secret:dpt/dev/data_flows_prefect_*"]
        );
    }

    #[test]
    fn test_provision_order_agent_then_flows() {
        let spec = DeploymentSpec::from_yaml(FULL).unwrap();
        let mut recorder = RecordingProvisioner::new();
        spec.provision(&mut recorder).unwrap();
        let names: Vec<&str> = recorder.roles().iter().map(RoleSpec::name).collect();
        assert_eq!(
            names,
            vec![
                "data-flows-prefect-agent-exec-role",
                "data-flows-prefect-agent-task-role",
                "data-flows-prefect-ecs-exec-role",
                "data-flows-prefect-ecs-task-role",
                "data-flows-prefect-ecs-gpu-exec-role",
                "data-flows-prefect-ecs-gpu-task-role",
            ]
        );
    }

    #[test]
    fn test_provision_into_terraform() {
        let spec = DeploymentSpec::from_yaml(FULL).unwrap();
        let mut tf = TerraformJson::new();
        spec.provision(&mut tf).unwrap();
        assert_eq!(tf.len(), 6);
        assert!(tf.resource("data_flows_prefect_ecs_gpu_task_role").is_some());
    }

    #[test]
    fn test_duplicate_deployment_type_rejected() {
        let yaml = FLOWS_ONLY.to_string()
            + "    - deployment_type: ecs\n      bucket_arn: arn:aws:s3:::other\n";
        let spec = DeploymentSpec::from_yaml(&yaml).unwrap();
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, SpecError::Validation(ref msg) if msg.contains("duplicate")));

        // provision validates before touching the provisioner
        let mut recorder = RecordingProvisioner::new();
        assert!(spec.provision(&mut recorder).is_err());
        assert!(recorder.roles().is_empty());
    }

    #[test]
    fn test_flow_colliding_with_agent_roles_rejected() {
        let yaml = FULL.to_string()
            + "    - deployment_type: agent\n      bucket_arn: arn:aws:s3:::my-bucket\n";
        let spec = DeploymentSpec::from_yaml(&yaml).unwrap();
        let err = spec.validate().unwrap_err();
        assert!(
            err.to_string().contains("data-flows-prefect-agent-exec-role"),
            "unexpected error: {}",
            err
        );

        let mut tf = TerraformJson::new();
        assert!(spec.provision(&mut tf).is_err());
        assert!(tf.is_empty());
    }

    #[test]
    fn test_empty_cluster_prefix_rejected() {
        for prefix in ["\"\"", "\"  \""] {
            let yaml = FULL.replace(
                "  agent:\n",
                &format!("  agent:\n    cluster_prefix: {}\n", prefix),
            );
            let spec = DeploymentSpec::from_yaml(&yaml).unwrap();
            assert_eq!(spec.spec.agent.as_ref().unwrap().cluster_prefix.trim(), "");
            let err = spec.validate().unwrap_err();
            assert!(err.to_string().contains("cluster_prefix"));
        }
    }

    #[test]
    fn test_wrong_api_version_rejected() {
        let yaml = FLOWS_ONLY.replace("flowrole/v1", "flowrole/v2");
        let spec = DeploymentSpec::from_yaml(&yaml).unwrap();
        assert!(matches!(spec.validate(), Err(SpecError::Validation(_))));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let yaml = FLOWS_ONLY.replace("kind: Deployment", "kind: Pod");
        let spec = DeploymentSpec::from_yaml(&yaml).unwrap();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("kind"));
    }

    #[test]
    fn test_empty_environment_rejected() {
        let yaml = FLOWS_ONLY.replace("environment: dev", "environment: \"\"");
        let spec = DeploymentSpec::from_yaml(&yaml).unwrap();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("spec.environment"));
    }

    #[test]
    fn test_missing_required_field_is_yaml_error() {
        let yaml = FLOWS_ONLY.replace("  region: eu-west-1\n", "");
        let result = DeploymentSpec::from_yaml(&yaml);
        assert!(matches!(result, Err(SpecError::Yaml(_))));
    }

    #[test]
    fn test_json_definition() {
        let spec = DeploymentSpec::new(DeploymentSpecInner {
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            environment: "prod".to_string(),
            agent: None,
            flows: vec![FlowSpec {
                deployment_type: "ecs".to_string(),
                bucket_arn: "arn:aws:s3:::b".to_string(),
            }],
        });
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"apiVersion\":\"flowrole/v1\""));
        let parsed = DeploymentSpec::from_json(&json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_load_by_extension() {
        let mut yaml_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(yaml_file, "{}", FLOWS_ONLY).unwrap();
        let spec = DeploymentSpec::load(yaml_file.path()).unwrap();
        assert_eq!(spec.spec.region, "eu-west-1");

        let mut json_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(json_file, "{}", serde_json::to_string(&spec).unwrap()).unwrap();
        let reloaded = DeploymentSpec::load(json_file.path()).unwrap();
        assert_eq!(reloaded, spec);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DeploymentSpec::load("/nonexistent/deployment.yaml").unwrap_err();
        assert!(matches!(err, SpecError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/deployment.yaml"));
    }
}
