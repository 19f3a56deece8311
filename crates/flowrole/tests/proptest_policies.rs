//! Property tests for the generated statements.
//!
//! Verifies:
//! - ARN patterns are the exact templates for any input
//! - Only the documented statements use the wildcard resource
//! - Building is deterministic (statements and digests)

use flowrole::{AccountContext, AgentPolicyBuilder, FlowRoleBuilder, PolicyDocument};
use proptest::prelude::*;

// ============================================
// Arbitrary generators
// ============================================

fn arb_account() -> impl Strategy<Value = AccountContext> {
    ("[0-9]{12}", "[a-z]{2}-[a-z]{4,9}-[1-3]")
        .prop_map(|(id, region)| AccountContext::new(id, region))
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,24}"
}

fn arb_secret_arn() -> impl Strategy<Value = String> {
    arb_name().prop_map(|n| format!("arn:aws:secretsmanager:us-east-1:123456789012:secret:{}", n))
}

fn arb_bucket_arn() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9.-]{2,40}".prop_map(|b| format!("arn:aws:s3:::{}", b))
}

proptest! {
    #[test]
    fn agent_execution_resources_are_exactly_the_secrets(
        docker in arb_secret_arn(),
        app in arb_secret_arn(),
        prefix in arb_name(),
        account in arb_account(),
    ) {
        let policies = AgentPolicyBuilder::new(&docker, &app, &prefix, account).build();
        prop_assert_eq!(policies.execution.len(), 1);
        prop_assert_eq!(policies.execution[0].resources(), [docker, app]);
    }

    #[test]
    fn agent_patterns_match_templates(
        prefix in arb_name(),
        account in arb_account(),
    ) {
        let policies = AgentPolicyBuilder::new("d", "a", &prefix, account.clone()).build();
        let cluster = format!(
            "arn:aws:ecs:{}:{}:cluster/{}*",
            account.region, account.account_id, prefix
        );
        let role = format!("arn:aws:iam::{}:role/{}*", account.account_id, prefix);

        prop_assert_eq!(&policies.task[1].conditions()[0].values, &vec![cluster]);
        prop_assert_eq!(policies.task[2].resources(), [role]);
    }

    #[test]
    fn only_task_definition_and_run_task_use_wildcard(
        prefix in arb_name(),
        account in arb_account(),
    ) {
        let policies = AgentPolicyBuilder::new("d", "a", &prefix, account).build();
        for stmt in policies.execution.iter().chain(policies.task.iter()) {
            if stmt.is_unrestricted() {
                let documented = stmt.grants("ecs:RegisterTaskDefinition")
                    || (stmt.grants("ecs:RunTask") && !stmt.conditions().is_empty());
                prop_assert!(documented, "unexpected wildcard statement: {:?}", stmt);
            }
        }
    }

    #[test]
    fn flow_patterns_match_templates(
        bucket in arb_bucket_arn(),
        account in arb_account(),
        environment in arb_name(),
        deployment_type in arb_name(),
    ) {
        let builder =
            FlowRoleBuilder::new(&bucket, account.clone(), &environment, &deployment_type);

        let secret = format!(
            "arn:aws:secretsmanager:{}:{}:secret:dpt/{}/data_flows_prefect_*",
            account.region, account.account_id, environment
        );
        let execution = builder.execution_statements();
        prop_assert_eq!(execution[0].resources(), [secret]);

        let task = builder.task_statements();
        let list: Vec<_> = task.iter().filter(|s| s.grants("s3:ListBucket")).collect();
        let objects: Vec<_> = task.iter().filter(|s| s.grants("s3:*Object")).collect();
        prop_assert_eq!(list.len(), 1);
        prop_assert_eq!(objects.len(), 1);
        prop_assert_eq!(list[0].resources(), [bucket.clone()]);
        prop_assert_eq!(objects[0].resources(), [format!("{}/data/*", bucket)]);
        prop_assert!(task.iter().all(|s| !s.is_unrestricted()));
    }

    #[test]
    fn flow_roles_are_deterministic(
        bucket in arb_bucket_arn(),
        account in arb_account(),
        environment in arb_name(),
        deployment_type in arb_name(),
    ) {
        let builder = FlowRoleBuilder::new(&bucket, account, &environment, &deployment_type);
        let first = builder.roles();
        let second = builder.roles();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first.task.access_document().sha256_hex().unwrap(),
            second.task.access_document().sha256_hex().unwrap()
        );
        prop_assert_eq!(
            first.task.name().to_string(),
            format!("data-flows-prefect-{}-task-role", deployment_type)
        );
    }

    #[test]
    fn rendered_documents_are_valid_json(
        docker in ".*",
        app in ".*",
        prefix in ".*",
    ) {
        let policies =
            AgentPolicyBuilder::new(docker, app, prefix, AccountContext::new("1", "r")).build();
        let json = PolicyDocument::new(policies.task).to_json().unwrap();
        prop_assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }
}
