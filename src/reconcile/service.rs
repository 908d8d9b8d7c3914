use tracing::{debug, info};

use crate::reconcile::{Outcome, Reconcile};
use crate::{CatalogBackend, Identity, Lookup, Options, RegisterError, Row, ServiceSpec};

/// Keeps catalog services in line with their descriptors.
///
/// A service whose name or description drifted is deleted and created again.
/// Under a templated catalog nothing is done at all.
pub struct ServiceReconciler<'a> {
    identity: &'a Identity,
    backend: CatalogBackend,
}

impl<'a> ServiceReconciler<'a> {
    /// Creates a service reconciler for a service using `backend`.
    pub fn new(identity: &'a Identity, backend: CatalogBackend) -> Self {
        Self { identity, backend }
    }

    fn create(&self, service: &ServiceSpec) -> Result<(), RegisterError> {
        let options = Options::new()
            .with("type", &service.service_type)
            .with("name", &service.name)
            .with_optional("description", service.description.as_deref());
        self.identity.change("service-create", &options)?;
        Ok(())
    }
}

fn needs_update(row: &Row, service: &ServiceSpec) -> bool {
    row.get("name") != Some(service.name.as_str())
        || row.get("description").unwrap_or_default()
            != service.description.as_deref().unwrap_or_default()
}

impl Reconcile for ServiceReconciler<'_> {
    type Descriptor = ServiceSpec;

    fn ensure(&self, service: &ServiceSpec) -> Result<Outcome, RegisterError> {
        if !self.backend.supports_dynamic_services() {
            debug!(service = %service.service_type, backend = %self.backend, "catalog is not managed");
            return Ok(Outcome::Skipped);
        }
        service.validate()?;

        let lookup = Lookup::new("service", "type", &service.service_type);
        match self.identity.find(&lookup)? {
            None => {
                self.create(service)?;
                info!(service = %service.service_type, name = %service.name, "created service");
                Ok(Outcome::Created)
            }
            Some(found) if !needs_update(&found.row, service) => {
                debug!(service = %service.service_type, "service is up to date");
                Ok(Outcome::Unchanged)
            }
            Some(found) => {
                self.identity
                    .change("service-delete", &Options::new().positional(&found.id))?;
                self.create(service)?;
                info!(service = %service.service_type, name = %service.name, "replaced service");
                Ok(Outcome::Replaced)
            }
        }
    }
}
