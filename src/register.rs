//! # Reconciliation Facade
//!
//! [`Register`] is the caller-facing surface: one `ensure_*` operation per
//! object kind, each returning whether a state-changing command was issued.
//! It owns the mutation flag, which is set the first time any of them changes
//! something and stays set for the life of the facade.
//!
//! A reconciler that fails after one of its commands already went through,
//! such as a replace whose create fails after the delete, still sets the flag.
//!
//! Manifests are applied in declaration order with [`Register::apply_all`].
//! The first failure stops the run; the objects reconciled before it are
//! reported alongside the error.

use std::sync::Arc;

use serde::Serialize;

use crate::reconcile::{
    Ec2CredentialReconciler, EndpointReconciler, Outcome, Reconcile, RoleGrantReconciler,
    RoleReconciler, ServiceReconciler, TenantReconciler, UserReconciler,
};
use crate::{
    CatalogBackend, CommandExecutor, CommandInvoker, Declaration, Ec2CredentialSpec, EndpointSpec,
    Identity, Manifest, PrettyTable, RegisterConfig, RegisterError, RoleGrantSpec, RoleSpec,
    ServiceSpec, TenantSpec, UserSpec,
};

/// Records whether anything was changed. Once set it is never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationFlag(bool);

impl MutationFlag {
    /// Sets the flag if `outcome` changed something.
    pub fn mark(&mut self, outcome: &Outcome) {
        self.0 |= outcome.changed();
    }

    /// Sets the flag.
    pub fn set(&mut self) {
        self.0 = true;
    }

    /// Returns true once any change was recorded.
    pub fn is_set(&self) -> bool {
        self.0
    }
}

/// What happened to one declared object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// The object kind.
    pub kind: &'static str,
    /// The object's label.
    pub name: String,
    /// What reconciling it did.
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// The result of applying a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// One entry per reconciled object, in declaration order.
    pub entries: Vec<ReportEntry>,
    /// True if any object was changed.
    pub updated: bool,
}

/// A manifest run that stopped at a failing object.
#[derive(Debug)]
pub struct ApplyFailure {
    /// The objects reconciled before the failure.
    pub completed: Report,
    /// Kind of the object that failed.
    pub kind: &'static str,
    /// Label of the object that failed.
    pub label: String,
    /// Why it failed.
    pub error: RegisterError,
}

impl std::fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}': {}", self.kind, self.label, self.error)
    }
}

impl std::error::Error for ApplyFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Converges identity-service objects toward their descriptors.
pub struct Register {
    identity: Identity,
    catalog_backend: CatalogBackend,
    updated: MutationFlag,
}

impl Register {
    /// Creates a facade over `identity` for a catalog using `catalog_backend`.
    pub fn new(identity: Identity, catalog_backend: CatalogBackend) -> Self {
        Self {
            identity,
            catalog_backend,
            updated: MutationFlag::default(),
        }
    }

    /// Creates a facade that runs the configured tool through `executor` and
    /// parses its pretty-printed tables.
    pub fn from_config(executor: Arc<dyn CommandExecutor>, config: &RegisterConfig) -> Self {
        let invoker = CommandInvoker::new(executor, config);
        let identity = Identity::new(invoker, Arc::new(PrettyTable));
        Self::new(identity, config.catalog_backend)
    }

    /// Returns true once any operation on this facade changed something.
    pub fn updated(&self) -> bool {
        self.updated.is_set()
    }

    fn record(&mut self, outcome: Result<Outcome, RegisterError>) -> Result<Outcome, RegisterError> {
        if self.identity.take_changed() {
            self.updated.set();
        }
        let outcome = outcome?;
        self.updated.mark(&outcome);
        Ok(outcome)
    }

    /// Ensures a tenant exists.
    pub fn ensure_tenant(&mut self, tenant: &TenantSpec) -> Result<bool, RegisterError> {
        let outcome = TenantReconciler::new(&self.identity).ensure(tenant);
        Ok(self.record(outcome)?.changed())
    }

    /// Ensures a catalog service exists and matches.
    pub fn ensure_service(&mut self, service: &ServiceSpec) -> Result<bool, RegisterError> {
        let outcome = ServiceReconciler::new(&self.identity, self.catalog_backend).ensure(service);
        Ok(self.record(outcome)?.changed())
    }

    /// Ensures a catalog endpoint exists and matches.
    pub fn ensure_endpoint(&mut self, endpoint: &EndpointSpec) -> Result<bool, RegisterError> {
        let outcome = EndpointReconciler::new(&self.identity, self.catalog_backend).ensure(endpoint);
        Ok(self.record(outcome)?.changed())
    }

    /// Ensures a role exists.
    pub fn ensure_role(&mut self, role: &RoleSpec) -> Result<bool, RegisterError> {
        let outcome = RoleReconciler::new(&self.identity).ensure(role);
        Ok(self.record(outcome)?.changed())
    }

    /// Ensures a user exists with the declared password.
    pub fn ensure_user(&mut self, user: &UserSpec) -> Result<bool, RegisterError> {
        let outcome = UserReconciler::new(&self.identity).ensure(user);
        Ok(self.record(outcome)?.changed())
    }

    /// Ensures a role is granted.
    pub fn ensure_role_grant(&mut self, grant: &RoleGrantSpec) -> Result<bool, RegisterError> {
        let outcome = RoleGrantReconciler::new(&self.identity).ensure(grant);
        Ok(self.record(outcome)?.changed())
    }

    /// Ensures a user has EC2 credentials in a tenant.
    ///
    /// Use [`Register::apply`] to get at a newly issued key pair.
    pub fn ensure_ec2_credential(
        &mut self,
        credential: &Ec2CredentialSpec,
    ) -> Result<bool, RegisterError> {
        let outcome = Ec2CredentialReconciler::new(&self.identity).ensure(credential);
        Ok(self.record(outcome)?.changed())
    }

    /// Reconciles one declared object of any kind.
    pub fn apply(&mut self, declaration: &Declaration) -> Result<Outcome, RegisterError> {
        let identity = &self.identity;
        let backend = self.catalog_backend;
        let outcome = match declaration {
            Declaration::Tenant(spec) => TenantReconciler::new(identity).ensure(spec),
            Declaration::Service(spec) => ServiceReconciler::new(identity, backend).ensure(spec),
            Declaration::Endpoint(spec) => EndpointReconciler::new(identity, backend).ensure(spec),
            Declaration::Role(spec) => RoleReconciler::new(identity).ensure(spec),
            Declaration::User(spec) => UserReconciler::new(identity).ensure(spec),
            Declaration::RoleGrant(spec) => RoleGrantReconciler::new(identity).ensure(spec),
            Declaration::Ec2Credential(spec) => Ec2CredentialReconciler::new(identity).ensure(spec),
        };
        self.record(outcome)
    }

    /// Reconciles every object in `manifest` in order, stopping at the first failure.
    pub fn apply_all(&mut self, manifest: &Manifest) -> Result<Report, ApplyFailure> {
        let mut report = Report::default();
        for declaration in &manifest.objects {
            match self.apply(declaration) {
                Ok(outcome) => report.entries.push(ReportEntry {
                    kind: declaration.kind(),
                    name: declaration.label(),
                    outcome,
                }),
                Err(error) => {
                    report.updated = self.updated();
                    return Err(ApplyFailure {
                        completed: report,
                        kind: declaration.kind(),
                        label: declaration.label(),
                        error,
                    });
                }
            }
        }
        report.updated = self.updated();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExecOutput;
    use crate::test_utils::test_helpers::{ScriptedExecutor, table, test_config};

    fn register(executor: &Arc<ScriptedExecutor>, backend: CatalogBackend) -> Register {
        let config = RegisterConfig {
            catalog_backend: backend,
            ..test_config()
        };
        Register::from_config(executor.clone(), &config)
    }

    #[test]
    fn flag_starts_clear() {
        let executor = Arc::new(ScriptedExecutor::new());
        let register = register(&executor, CatalogBackend::Sql);
        assert!(!register.updated());
    }

    #[test]
    fn unchanged_objects_leave_flag_clear() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on("role-list", &table(&["id", "name"], &[&["ABC", "role1"]]));
        let mut register = register(&executor, CatalogBackend::Sql);

        assert!(!register.ensure_role(&RoleSpec::new("role1")).unwrap());
        assert!(!register.updated());
    }

    #[test]
    fn flag_stays_set_after_later_no_ops() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on("role-list", &table(&["id", "name"], &[]));
        executor.on("role-list", &table(&["id", "name"], &[&["ABC", "role1"]]));
        let mut register = register(&executor, CatalogBackend::Sql);

        assert!(register.ensure_role(&RoleSpec::new("role1")).unwrap());
        assert!(!register.ensure_role(&RoleSpec::new("role1")).unwrap());
        assert!(register.updated());
    }

    #[test]
    fn templated_backend_skips_catalog_objects() {
        let executor = Arc::new(ScriptedExecutor::new());
        let mut register = register(&executor, CatalogBackend::Templated);

        let changed = register
            .ensure_service(&ServiceSpec::new("compute", "nova"))
            .unwrap();

        assert!(!changed);
        assert!(!register.updated());
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn apply_all_stops_at_first_failure() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on("tenant-list", &table(&["id", "name"], &[]));
        executor.on_output("role-list", ExecOutput::failure(1, "Unauthorized"));
        let manifest = Manifest {
            objects: vec![
                Declaration::Tenant(TenantSpec::new("tenant1")),
                Declaration::Role(RoleSpec::new("role1")),
                Declaration::Role(RoleSpec::new("role2")),
            ],
        };
        let mut register = register(&executor, CatalogBackend::Sql);

        let failure = register.apply_all(&manifest).unwrap_err();

        assert_eq!(failure.kind, "role");
        assert_eq!(failure.label, "role1");
        assert_eq!(failure.completed.entries.len(), 1);
        assert_eq!(failure.completed.entries[0].outcome, Outcome::Created);
        assert!(failure.completed.updated);
        assert!(register.updated());
        assert_eq!(
            executor.verbs(),
            vec!["tenant-list", "tenant-create", "role-list"]
        );
    }

    #[test]
    fn failed_create_after_delete_still_sets_flag() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on(
            "service-list",
            &table(
                &["id", "name", "type", "description"],
                &[&["S1", "nova-legacy", "compute", ""]],
            ),
        );
        executor.on_output("service-create", ExecOutput::failure(1, "Conflict"));
        let mut register = register(&executor, CatalogBackend::Sql);

        let result = register.ensure_service(&ServiceSpec::new("compute", "nova"));

        assert!(matches!(result, Err(RegisterError::Command(ref e)) if e.verb == "service-create"));
        assert_eq!(
            executor.verbs(),
            vec!["service-list", "service-delete", "service-create"]
        );
        assert!(register.updated());
    }

    #[test]
    fn partial_replace_is_reported_as_updated() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on(
            "service-list",
            &table(
                &["id", "name", "type", "description"],
                &[&["S1", "nova-legacy", "compute", ""]],
            ),
        );
        executor.on_output("service-create", ExecOutput::failure(1, "Conflict"));
        let manifest = Manifest {
            objects: vec![Declaration::Service(ServiceSpec::new("compute", "nova"))],
        };
        let mut register = register(&executor, CatalogBackend::Sql);

        let failure = register.apply_all(&manifest).unwrap_err();

        assert!(failure.completed.entries.is_empty());
        assert!(failure.completed.updated);
    }

    #[test]
    fn failed_lookup_leaves_flag_clear() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on_output("role-list", ExecOutput::failure(1, "Unauthorized"));
        let mut register = register(&executor, CatalogBackend::Sql);

        assert!(register.ensure_role(&RoleSpec::new("role1")).is_err());
        assert!(!register.updated());
    }

    #[test]
    fn report_lists_objects_in_order() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on("tenant-list", &table(&["id", "name"], &[&["T", "tenant1"]]));
        executor.on("role-list", &table(&["id", "name"], &[]));
        let manifest = Manifest {
            objects: vec![
                Declaration::Tenant(TenantSpec::new("tenant1")),
                Declaration::Role(RoleSpec::new("role1")),
            ],
        };
        let mut register = register(&executor, CatalogBackend::Sql);

        let report = register.apply_all(&manifest).unwrap();

        let summary: Vec<_> = report
            .entries
            .iter()
            .map(|entry| (entry.kind, entry.name.as_str(), entry.outcome.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("tenant", "tenant1", Outcome::Unchanged),
                ("role", "role1", Outcome::Created),
            ]
        );
        assert!(report.updated);
    }

    #[test]
    fn report_serializes_with_action_tags() {
        let report = Report {
            entries: vec![ReportEntry {
                kind: "role",
                name: "role1".to_string(),
                outcome: Outcome::Created,
            }],
            updated: true,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entries": [{"kind": "role", "name": "role1", "action": "created"}],
                "updated": true,
            })
        );
    }
}
