//! Error types for rendering and provisioning.
//!
//! Building statements never fails. Errors only appear once statements are
//! serialized or handed to a provisioner.

use thiserror::Error;

/// Result type for flowrole operations.
pub type Result<T> = std::result::Result<T, IamError>;

/// Errors raised while rendering documents or creating roles.
#[derive(Error, Debug)]
pub enum IamError {
    /// A document could not be serialized to JSON.
    #[error("failed to serialize policy document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A role mapping to an already used resource id was handed to the provisioner.
    #[error("role '{name}' maps to resource '{logical_id}', which was already created")]
    DuplicateRole {
        /// Name of the rejected role.
        name: String,
        /// Resource id shared with the earlier role.
        logical_id: String,
    },

    /// The provisioner refused the role.
    #[error("provisioner rejected role '{name}': {reason}")]
    Provision {
        /// Name of the role.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}
