//! ARN templates for the resource and condition patterns the builders emit.
//!
//! Every pattern is either an exact ARN or a prefix wildcard (`...*`). Inputs
//! are interpolated verbatim; a malformed account id or prefix produces a
//! malformed pattern, which the provisioning engine rejects at apply time.

use crate::AccountContext;

/// Wildcard resource. Only used where the scope lives elsewhere (a condition)
/// or cannot be known when the policy is authored.
pub const ALL_RESOURCES: &str = "*";

/// Prefix that flow secrets share under an environment namespace.
pub const FLOW_SECRET_PREFIX: &str = "data_flows_prefect_";

/// `arn:aws:ecs:<region>:<account>:cluster/<prefix>*`
pub fn ecs_cluster_pattern(account: &AccountContext, cluster_prefix: &str) -> String {
    format!(
        "arn:aws:ecs:{}:{}:cluster/{}*",
        account.region, account.account_id, cluster_prefix
    )
}

/// `arn:aws:iam::<account>:role/<prefix>*`
///
/// IAM is global, so the region is not part of the ARN.
pub fn iam_role_pattern(account: &AccountContext, role_prefix: &str) -> String {
    format!("arn:aws:iam::{}:role/{}*", account.account_id, role_prefix)
}

/// `arn:aws:secretsmanager:<region>:<account>:secret:dpt/<environment>/data_flows_prefect_*`
pub fn flow_secret_pattern(account: &AccountContext, environment: &str) -> String {
    format!(
        "arn:aws:secretsmanager:{}:{}:secret:dpt/{}/{}*",
        account.region, account.account_id, environment, FLOW_SECRET_PREFIX
    )
}

/// `<bucket_arn>/data/*`
pub fn bucket_data_pattern(bucket_arn: &str) -> String {
    format!("{}/data/*", bucket_arn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountContext {
        AccountContext::new("123456789012", "us-east-1")
    }

    #[test]
    fn test_ecs_cluster_pattern() {
        assert_eq!(
            ecs_cluster_pattern(&account(), "data-flows-prefect"),
            "arn:aws:ecs:us-east-1:123456789012:cluster/data-flows-prefect*"
        );
    }

    #[test]
    fn test_iam_role_pattern_omits_region() {
        let pattern = iam_role_pattern(&account(), "data-flows-prefect");
        assert_eq!(pattern, "arn:aws:iam::123456789012:role/data-flows-prefect*");
        assert!(!pattern.contains("us-east-1"));
    }

    #[test]
    fn test_flow_secret_pattern() {
        assert_eq!(
            flow_secret_pattern(&account(), "prod"),
            "arn:aws:secretsmanager:us-east-1:123456789012:secret:dpt/prod/data_flows_prefect_*"
        );
    }

    #[test]
    fn test_bucket_data_pattern() {
        assert_eq!(
            bucket_data_pattern("arn:aws:s3:::my-bucket"),
            "arn:aws:s3:::my-bucket/data/*"
        );
    }

    #[test]
    fn test_empty_prefix_is_interpolated_verbatim() {
        // No validation: an empty prefix widens the pattern to every cluster.
        assert_eq!(
            ecs_cluster_pattern(&account(), ""),
            "arn:aws:ecs:us-east-1:123456789012:cluster/*"
        );
    }
}
