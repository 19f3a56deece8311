//! Policy documents in the AWS JSON policy grammar.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::statement::PolicyStatement;

/// Policy language version stamped on every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// A complete policy document: `{"Version": ..., "Statement": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Statement")]
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Wrap statements in a document with the current policy version.
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements,
        }
    }

    /// The policy language version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Statements in authoring order.
    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    /// Compact JSON, as embedded in role resources.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON for humans.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the compact JSON, hex encoded.
    ///
    /// Equal documents always have equal digests, so the digest can be compared
    /// against a previously rendered one to detect drift.
    pub fn sha256_hex(&self) -> Result<String> {
        let json = self.to_json()?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }
}
