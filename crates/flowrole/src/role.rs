//! Role definitions: a name, a trust policy and one inline access policy.

use crate::actions;
use crate::document::PolicyDocument;
use crate::statement::{PolicyStatement, Principal};

/// Service principal ECS uses to assume task and execution roles.
pub const ECS_TASKS_SERVICE: &str = "ecs-tasks.amazonaws.com";

/// Trust policy allowing ECS tasks to assume a role.
pub fn ecs_trust_policy() -> Vec<PolicyStatement> {
    vec![PolicyStatement::allow(actions::ASSUME_ROLE.iter().copied())
        .for_principal(Principal::service(ECS_TASKS_SERVICE))]
}

/// A role ready to be handed to a [`RoleProvisioner`](crate::RoleProvisioner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    name: String,
    trust_policy: Vec<PolicyStatement>,
    inline_policy: Vec<PolicyStatement>,
}

impl RoleSpec {
    /// Create a role with an explicit trust policy.
    pub fn new(
        name: impl Into<String>,
        trust_policy: Vec<PolicyStatement>,
        inline_policy: Vec<PolicyStatement>,
    ) -> Self {
        Self {
            name: name.into(),
            trust_policy,
            inline_policy,
        }
    }

    /// Create a role assumable by ECS tasks.
    pub fn ecs_task_role(name: impl Into<String>, inline_policy: Vec<PolicyStatement>) -> Self {
        Self::new(name, ecs_trust_policy(), inline_policy)
    }

    /// Role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trust policy statements.
    pub fn trust_policy(&self) -> &[PolicyStatement] {
        &self.trust_policy
    }

    /// Inline access policy statements.
    pub fn inline_policy(&self) -> &[PolicyStatement] {
        &self.inline_policy
    }

    /// Name of the inline policy attached to the role.
    pub fn inline_policy_name(&self) -> String {
        format!("{}-access-policy", self.name)
    }

    /// Trust policy as a document.
    pub fn trust_document(&self) -> PolicyDocument {
        PolicyDocument::new(self.trust_policy.clone())
    }

    /// Inline access policy as a document.
    pub fn access_document(&self) -> PolicyDocument {
        PolicyDocument::new(self.inline_policy.clone())
    }
}

/// The execution role and task role of one ECS workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePair {
    /// Role ECS uses to pull images and read secrets while starting the task.
    pub execution: RoleSpec,
    /// Role the running task's code acts as.
    pub task: RoleSpec,
}

impl RolePair {
    /// Execution role first, then task role.
    pub fn iter(&self) -> impl Iterator<Item = &RoleSpec> {
        [&self.execution, &self.task].into_iter()
    }
}
