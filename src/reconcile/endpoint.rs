use tracing::{debug, info};

use crate::reconcile::{Outcome, Reconcile};
use crate::{CatalogBackend, EndpointSpec, Identity, Lookup, Options, RegisterError, Row};

/// Keeps a service's endpoint in line with its descriptor.
///
/// The endpoint is found by the owning service's id alone, so a service is
/// assumed to have at most one endpoint. An endpoint whose region or URLs
/// drifted is deleted and created again.
pub struct EndpointReconciler<'a> {
    identity: &'a Identity,
    backend: CatalogBackend,
}

impl<'a> EndpointReconciler<'a> {
    /// Creates an endpoint reconciler for a catalog using `backend`.
    pub fn new(identity: &'a Identity, backend: CatalogBackend) -> Self {
        Self { identity, backend }
    }

    fn create(&self, endpoint: &EndpointSpec, service_id: &str) -> Result<(), RegisterError> {
        let options = Options::new()
            .with("region", &endpoint.region)
            .with("service_id", service_id)
            .with("publicurl", &endpoint.publicurl)
            .with_optional("internalurl", endpoint.internalurl.as_deref())
            .with_optional("adminurl", endpoint.adminurl.as_deref());
        self.identity.change("endpoint-create", &options)?;
        Ok(())
    }
}

// Internal and admin URLs are only compared when declared.
fn needs_update(row: &Row, endpoint: &EndpointSpec) -> bool {
    let differs = |column: &str, desired: Option<&str>| match desired {
        Some(desired) => row.get(column) != Some(desired),
        None => false,
    };
    differs("region", Some(endpoint.region.as_str()))
        || differs("publicurl", Some(endpoint.publicurl.as_str()))
        || differs("internalurl", endpoint.internalurl.as_deref())
        || differs("adminurl", endpoint.adminurl.as_deref())
}

impl Reconcile for EndpointReconciler<'_> {
    type Descriptor = EndpointSpec;

    fn ensure(&self, endpoint: &EndpointSpec) -> Result<Outcome, RegisterError> {
        if !self.backend.supports_dynamic_services() {
            debug!(service = %endpoint.service_type, backend = %self.backend, "catalog is not managed");
            return Ok(Outcome::Skipped);
        }
        endpoint.validate()?;

        let service_id = self.identity.require_id(&Lookup::new(
            "service",
            "type",
            &endpoint.service_type,
        ))?;
        let lookup = Lookup::new("endpoint", "service_id", &service_id);
        match self.identity.find(&lookup)? {
            None => {
                self.create(endpoint, &service_id)?;
                info!(service = %endpoint.service_type, region = %endpoint.region, "created endpoint");
                Ok(Outcome::Created)
            }
            Some(found) if !needs_update(&found.row, endpoint) => {
                debug!(service = %endpoint.service_type, region = %endpoint.region, "endpoint is up to date");
                Ok(Outcome::Unchanged)
            }
            Some(found) => {
                self.identity
                    .change("endpoint-delete", &Options::new().positional(&found.id))?;
                self.create(endpoint, &service_id)?;
                info!(service = %endpoint.service_type, region = %endpoint.region, "replaced endpoint");
                Ok(Outcome::Replaced)
            }
        }
    }
}
