//! Roles for Prefect flow runs.
//!
//! Each deployment type (e.g. `ecs`) gets its own pair of roles. The execution
//! role reads the flow secrets of one environment; the task role reads and
//! writes objects under the `data/` prefix of the flow storage bucket.

use tracing::{debug, info};

use crate::actions;
use crate::arn;
use crate::context::AccountContext;
use crate::error::Result;
use crate::provision::RoleProvisioner;
use crate::role::{RolePair, RoleSpec};
use crate::statement::PolicyStatement;

/// Prefix of every flow role name.
pub const FLOW_ROLE_PREFIX: &str = "data-flows-prefect";

/// Builds and provisions the execution and task roles for flow runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRoleBuilder {
    bucket_arn: String,
    account: AccountContext,
    environment: String,
    deployment_type: String,
}

impl FlowRoleBuilder {
    /// Create a builder. Inputs are interpolated as given.
    pub fn new(
        bucket_arn: impl Into<String>,
        account: AccountContext,
        environment: impl Into<String>,
        deployment_type: impl Into<String>,
    ) -> Self {
        Self {
            bucket_arn: bucket_arn.into(),
            account,
            environment: environment.into(),
            deployment_type: deployment_type.into(),
        }
    }

    /// Deployment-type label used in role names.
    pub fn deployment_type(&self) -> &str {
        &self.deployment_type
    }

    /// `data-flows-prefect-<deployment_type>-exec-role`
    pub fn execution_role_name(&self) -> String {
        format!("{}-{}-exec-role", FLOW_ROLE_PREFIX, self.deployment_type)
    }

    /// `data-flows-prefect-<deployment_type>-task-role`
    pub fn task_role_name(&self) -> String {
        format!("{}-{}-task-role", FLOW_ROLE_PREFIX, self.deployment_type)
    }

    /// Secret read access on the environment's flow secrets.
    pub fn execution_statements(&self) -> Vec<PolicyStatement> {
        vec![PolicyStatement::allow(actions::SECRET_READ.iter().copied())
            .on([arn::flow_secret_pattern(&self.account, &self.environment)])]
    }

    /// Bucket listing plus object access under `data/`.
    pub fn task_statements(&self) -> Vec<PolicyStatement> {
        vec![self.bucket_access(), self.object_access()]
    }

    /// Both roles, without provisioning them.
    pub fn roles(&self) -> RolePair {
        let execution = self.execution_statements();
        let task = self.task_statements();
        debug!(
            account = %self.account,
            environment = %self.environment,
            deployment_type = %self.deployment_type,
            "built flow role statements"
        );
        RolePair {
            execution: RoleSpec::ecs_task_role(self.execution_role_name(), execution),
            task: RoleSpec::ecs_task_role(self.task_role_name(), task),
        }
    }

    /// Build both roles and hand them to `provisioner`, execution role first.
    pub fn build<P: RoleProvisioner + ?Sized>(&self, provisioner: &mut P) -> Result<RolePair> {
        let roles = self.roles();
        for role in roles.iter() {
            info!(role = %role.name(), "creating flow role");
            provisioner.create_role(role)?;
        }
        Ok(roles)
    }

    fn bucket_access(&self) -> PolicyStatement {
        PolicyStatement::allow(actions::S3_LIST_BUCKET.iter().copied())
            .on([self.bucket_arn.as_str()])
    }

    fn object_access(&self) -> PolicyStatement {
        PolicyStatement::allow(actions::S3_OBJECT.iter().copied())
            .on([arn::bucket_data_pattern(&self.bucket_arn)])
    }
}
