use tracing::{debug, info};

use crate::reconcile::{Outcome, Reconcile};
use crate::{Identity, Lookup, Options, RegisterError, RoleGrantSpec};

/// Grants roles to users within a tenant.
pub struct RoleGrantReconciler<'a> {
    identity: &'a Identity,
}

impl<'a> RoleGrantReconciler<'a> {
    /// Creates a role grant reconciler.
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }
}

impl Reconcile for RoleGrantReconciler<'_> {
    type Descriptor = RoleGrantSpec;

    fn ensure(&self, grant: &RoleGrantSpec) -> Result<Outcome, RegisterError> {
        grant.validate()?;

        let tenant_id = self
            .identity
            .require_id(&Lookup::new("tenant", "name", &grant.tenant_name))?;
        let user_id = self
            .identity
            .require_id(&Lookup::new("user", "name", &grant.user_name))?;
        let role_id = self
            .identity
            .require_id(&Lookup::new("role", "name", &grant.role_name))?;

        let scope = Options::new()
            .with("tenant-id", &tenant_id)
            .with("user-id", &user_id);
        let granted = self
            .identity
            .find_id(&Lookup::new("user-role", "name", &grant.role_name).args(scope))?;
        if granted.as_deref() == Some(role_id.as_str()) {
            debug!(role = %grant.role_name, user = %grant.user_name, tenant = %grant.tenant_name, "role already granted");
            return Ok(Outcome::Unchanged);
        }

        let options = Options::new()
            .with("tenant-id", &tenant_id)
            .with("role-id", &role_id)
            .with("user-id", &user_id);
        self.identity.change("user-role-add", &options)?;
        info!(role = %grant.role_name, user = %grant.user_name, tenant = %grant.tenant_name, "granted role");
        Ok(Outcome::Granted)
    }
}
