use tracing::{debug, info};

use crate::reconcile::{Outcome, Reconcile};
use crate::{Identity, Lookup, Options, RegisterError, TenantSpec};

/// Creates tenants that do not exist yet.
///
/// Existing tenants are never modified, even if their description or enabled
/// flag differ from the descriptor.
pub struct TenantReconciler<'a> {
    identity: &'a Identity,
}

impl<'a> TenantReconciler<'a> {
    /// Creates a tenant reconciler.
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }
}

impl Reconcile for TenantReconciler<'_> {
    type Descriptor = TenantSpec;

    fn ensure(&self, tenant: &TenantSpec) -> Result<Outcome, RegisterError> {
        tenant.validate()?;

        if self
            .identity
            .find_id(&Lookup::new("tenant", "name", &tenant.name))?
            .is_some()
        {
            debug!(tenant = %tenant.name, "tenant already exists");
            return Ok(Outcome::Unchanged);
        }

        let options = Options::new()
            .with("name", &tenant.name)
            .with_optional("description", tenant.description.as_deref())
            .with("enabled", tenant.enabled);
        self.identity.change("tenant-create", &options)?;
        info!(tenant = %tenant.name, "created tenant");
        Ok(Outcome::Created)
    }
}
