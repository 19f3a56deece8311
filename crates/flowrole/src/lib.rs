//! # Flowrole
//!
//! IAM role and policy generation for a Prefect v2 deployment on ECS.
//!
//! Two builders turn identity/context parameters into least-privilege policy
//! statements:
//!
//! | Builder | Inputs | Produces |
//! |---------|--------|----------|
//! | [`AgentPolicyBuilder`] | docker secret, app secret, cluster prefix, account | agent execution + task statements |
//! | [`FlowRoleBuilder`] | bucket, account, environment, deployment type | flow execution + task roles |
//!
//! Both are pure: the same inputs always produce the same statements, in the
//! same order. Nothing here talks to AWS. Finished roles are handed to a
//! [`RoleProvisioner`], which decides what "creating" a role means (recording
//! it in memory, or rendering Terraform JSON for an external engine to apply).
//!
//! ## Example
//!
//! ```rust
//! use flowrole::{AccountContext, FlowRoleBuilder, RecordingProvisioner};
//!
//! let account = AccountContext::new("123456789012", "us-east-1");
//! let builder = FlowRoleBuilder::new("arn:aws:s3:::my-bucket", account, "prod", "ecs");
//!
//! let mut provisioner = RecordingProvisioner::new();
//! let roles = builder.build(&mut provisioner).unwrap();
//!
//! assert_eq!(roles.task.name(), "data-flows-prefect-ecs-task-role");
//! assert_eq!(provisioner.roles().len(), 2);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod actions;
mod agent;
pub mod arn;
mod context;
mod document;
mod error;
mod flow;
mod provision;
mod role;
mod statement;
mod terraform;

pub use agent::{AgentPolicies, AgentPolicyBuilder};
pub use context::AccountContext;
pub use document::{PolicyDocument, POLICY_VERSION};
pub use error::{IamError, Result};
pub use flow::FlowRoleBuilder;
pub use provision::{RecordingProvisioner, RoleProvisioner};
pub use role::{ecs_trust_policy, RolePair, RoleSpec, ECS_TASKS_SERVICE};
pub use statement::{Condition, Effect, PolicyStatement, Principal};
pub use terraform::TerraformJson;
