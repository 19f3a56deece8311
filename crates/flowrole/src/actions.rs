//! Action tables used by the built-in statements.
//!
//! Order matters only for output stability: documents list actions exactly as
//! they appear here.

/// Read access to secrets referenced by an ECS task definition.
pub const SECRET_READ: &[&str] = &[
    "kms:Decrypt",
    "secretsmanager:GetSecretValue",
    "ssm:GetParameters",
];

/// ECS task-definition lifecycle. Task-definition ARNs are not known when the
/// policy is authored, so these are granted on all resources.
pub const TASK_DEFINITION_MANAGEMENT: &[&str] = &[
    "ecs:RegisterTaskDefinition",
    "ecs:ListTaskDefinitions",
    "ecs:DescribeTaskDefinition",
    "ecs:DeregisterTaskDefinition",
];

/// Starting and stopping ECS tasks.
pub const TASK_RUN: &[&str] = &["ecs:StopTask", "ecs:RunTask"];

/// Handing a role to ECS when running a task.
pub const PASS_ROLE: &[&str] = &["iam:PassRole"];

/// Listing a bucket.
pub const S3_LIST_BUCKET: &[&str] = &["s3:ListBucket"];

/// Get/put/delete on objects.
pub const S3_OBJECT: &[&str] = &["s3:*Object"];

/// Trust-policy action.
pub const ASSUME_ROLE: &[&str] = &["sts:AssumeRole"];

/// ECS cluster condition key.
pub const ECS_CLUSTER_KEY: &str = "ecs:cluster";
