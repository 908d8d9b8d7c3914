use tracing::{debug, info};

use crate::reconcile::{Outcome, Reconcile};
use crate::{Identity, Lookup, Options, RegisterError, RoleSpec};

/// Creates roles that do not exist yet.
pub struct RoleReconciler<'a> {
    identity: &'a Identity,
}

impl<'a> RoleReconciler<'a> {
    /// Creates a role reconciler.
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }
}

impl Reconcile for RoleReconciler<'_> {
    type Descriptor = RoleSpec;

    fn ensure(&self, role: &RoleSpec) -> Result<Outcome, RegisterError> {
        role.validate()?;

        if self
            .identity
            .find_id(&Lookup::new("role", "name", &role.name))?
            .is_some()
        {
            debug!(role = %role.name, "role already exists");
            return Ok(Outcome::Unchanged);
        }

        self.identity
            .change("role-create", &Options::new().with("name", &role.name))?;
        info!(role = %role.name, "created role");
        Ok(Outcome::Created)
    }
}
