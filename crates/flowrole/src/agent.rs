//! Policies for the Prefect agent.
//!
//! The agent runs as an ECS service. Its execution role reads the two secrets
//! the service needs at start-up (registry credentials and the Prefect API
//! secret). Its task role lets it register task definitions and start flow runs
//! as tasks on clusters whose names share the agent's prefix, passing roles that
//! share the same prefix.

use tracing::{debug, info};

use crate::actions;
use crate::arn::{self, ALL_RESOURCES};
use crate::context::AccountContext;
use crate::error::Result;
use crate::provision::RoleProvisioner;
use crate::role::{RolePair, RoleSpec};
use crate::statement::{Condition, PolicyStatement};

/// Execution and task statement sets for the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPolicies {
    /// Statements for the agent's execution role.
    pub execution: Vec<PolicyStatement>,
    /// Statements for the agent's task role.
    pub task: Vec<PolicyStatement>,
}

/// Builds the agent's policy statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPolicyBuilder {
    docker_secret_arn: String,
    app_secret_arn: String,
    cluster_prefix: String,
    account: AccountContext,
}

impl AgentPolicyBuilder {
    /// Create a builder. Inputs are interpolated as given.
    pub fn new(
        docker_secret_arn: impl Into<String>,
        app_secret_arn: impl Into<String>,
        cluster_prefix: impl Into<String>,
        account: AccountContext,
    ) -> Self {
        Self {
            docker_secret_arn: docker_secret_arn.into(),
            app_secret_arn: app_secret_arn.into(),
            cluster_prefix: cluster_prefix.into(),
            account,
        }
    }

    /// The ECS cluster/role name prefix.
    pub fn cluster_prefix(&self) -> &str {
        &self.cluster_prefix
    }

    /// Build both statement sets.
    pub fn build(&self) -> AgentPolicies {
        let policies = AgentPolicies {
            execution: self.execution_statements(),
            task: self.task_statements(),
        };
        debug!(
            account = %self.account,
            cluster_prefix = %self.cluster_prefix,
            execution = policies.execution.len(),
            task = policies.task.len(),
            "built agent policy statements"
        );
        policies
    }

    /// Secret read access on exactly the docker and app secrets, in that order.
    pub fn execution_statements(&self) -> Vec<PolicyStatement> {
        vec![PolicyStatement::allow(actions::SECRET_READ.iter().copied())
            .on([self.docker_secret_arn.as_str(), self.app_secret_arn.as_str()])]
    }

    /// Task-definition management, cluster-scoped run/stop, and PassRole.
    pub fn task_statements(&self) -> Vec<PolicyStatement> {
        vec![
            self.task_definition_access(),
            self.ecs_task_access(),
            self.pass_role_access(),
        ]
    }

    /// Role names: `<prefix>-agent-exec-role` and `<prefix>-agent-task-role`.
    ///
    /// Both fall under the agent's own PassRole pattern.
    pub fn role_names(&self) -> (String, String) {
        (
            format!("{}-agent-exec-role", self.cluster_prefix),
            format!("{}-agent-task-role", self.cluster_prefix),
        )
    }

    /// Wrap the statement sets in ECS-assumable roles.
    pub fn roles(&self) -> RolePair {
        let AgentPolicies { execution, task } = self.build();
        let (exec_name, task_name) = self.role_names();
        RolePair {
            execution: RoleSpec::ecs_task_role(exec_name, execution),
            task: RoleSpec::ecs_task_role(task_name, task),
        }
    }

    /// Hand both agent roles to `provisioner`, execution role first.
    pub fn provision<P: RoleProvisioner + ?Sized>(&self, provisioner: &mut P) -> Result<RolePair> {
        let roles = self.roles();
        for role in roles.iter() {
            info!(role = %role.name(), "creating agent role");
            provisioner.create_role(role)?;
        }
        Ok(roles)
    }

    // Task-definition ARNs are not predictable when the policy is written, so
    // this grant is account-wide.
    fn task_definition_access(&self) -> PolicyStatement {
        PolicyStatement::allow(actions::TASK_DEFINITION_MANAGEMENT.iter().copied())
            .on([ALL_RESOURCES])
    }

    fn ecs_task_access(&self) -> PolicyStatement {
        PolicyStatement::allow(actions::TASK_RUN.iter().copied())
            .on([ALL_RESOURCES])
            .when(Condition::arn_like(
                actions::ECS_CLUSTER_KEY,
                [arn::ecs_cluster_pattern(&self.account, &self.cluster_prefix)],
            ))
    }

    fn pass_role_access(&self) -> PolicyStatement {
        PolicyStatement::allow(actions::PASS_ROLE.iter().copied())
            .on([arn::iam_role_pattern(&self.account, &self.cluster_prefix)])
    }
}
