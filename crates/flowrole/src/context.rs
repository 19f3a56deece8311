//! Account identity passed explicitly to each builder.

use serde::{Deserialize, Serialize};

/// The AWS account and region a deployment targets.
///
/// Both values are opaque: they are interpolated into ARN patterns as given
/// and never validated or resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountContext {
    /// Twelve-digit account identifier.
    pub account_id: String,
    /// Region name, e.g. `us-east-1`.
    pub region: String,
}

impl AccountContext {
    /// Create a context from an account id and region name.
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for AccountContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account_id, self.region)
    }
}
