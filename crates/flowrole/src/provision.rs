//! The seam between role construction and whatever creates roles.
//!
//! Builders never create anything themselves. They pass finished
//! [`RoleSpec`]s to a [`RoleProvisioner`], in a fixed order.

use tracing::debug;

use crate::error::Result;
use crate::role::RoleSpec;

/// Receives finished roles.
pub trait RoleProvisioner {
    /// Request creation of `role`.
    fn create_role(&mut self, role: &RoleSpec) -> Result<()>;
}

impl<P: RoleProvisioner + ?Sized> RoleProvisioner for &mut P {
    fn create_role(&mut self, role: &RoleSpec) -> Result<()> {
        (**self).create_role(role)
    }
}

/// Keeps every role it is given, in creation order.
#[derive(Debug, Clone, Default)]
pub struct RecordingProvisioner {
    roles: Vec<RoleSpec>,
}

impl RecordingProvisioner {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Roles in creation order.
    pub fn roles(&self) -> &[RoleSpec] {
        &self.roles
    }

    /// Look up a role by name.
    pub fn find(&self, name: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.name() == name)
    }

    /// Take the recorded roles.
    pub fn into_roles(self) -> Vec<RoleSpec> {
        self.roles
    }
}

impl RoleProvisioner for RecordingProvisioner {
    fn create_role(&mut self, role: &RoleSpec) -> Result<()> {
        debug!(role = %role.name(), "recorded role");
        self.roles.push(role.clone());
        Ok(())
    }
}
