//! # Object Descriptors
//!
//! The desired state of each kind of identity-service object. Descriptors are
//! read-only inputs to reconciliation: they are filled in by the caller (or
//! loaded from a manifest) and never modified by a reconciler.
//!
//! Required attributes are plain strings and are checked to be non-empty before
//! any command is issued. Optional attributes are `Option`s and are left off the
//! command line entirely when absent.

use serde::{Deserialize, Serialize};

use crate::RegisterError;

fn default_enabled() -> bool {
    true
}

pub(crate) fn required<'a>(
    kind: &'static str,
    attribute: &'static str,
    value: &'a str,
) -> Result<&'a str, RegisterError> {
    if value.is_empty() {
        Err(RegisterError::MissingAttribute { kind, attribute })
    } else {
        Ok(value)
    }
}

/// A tenant (project).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSpec {
    /// Tenant name; the natural key.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the tenant is enabled on creation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl TenantSpec {
    /// An enabled tenant with no description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
        }
    }

    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("tenant", "name", &self.name)?;
        Ok(())
    }
}

/// A service in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Service type such as `compute` or `identity`; the natural key.
    #[serde(rename = "type", default)]
    pub service_type: String,
    /// Service name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServiceSpec {
    /// A service with no description.
    pub fn new(service_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            name: name.into(),
            description: None,
        }
    }

    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("service", "type", &self.service_type)?;
        required("service", "name", &self.name)?;
        Ok(())
    }
}

/// The URLs of a service within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Region name.
    #[serde(default)]
    pub region: String,
    /// Type of the service the endpoint belongs to.
    #[serde(default)]
    pub service_type: String,
    /// Public URL.
    #[serde(default)]
    pub publicurl: String,
    /// Internal URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internalurl: Option<String>,
    /// Admin URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adminurl: Option<String>,
}

impl EndpointSpec {
    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("endpoint", "region", &self.region)?;
        required("endpoint", "service_type", &self.service_type)?;
        required("endpoint", "publicurl", &self.publicurl)?;
        Ok(())
    }
}

/// A role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Role name; the natural key.
    #[serde(default)]
    pub name: String,
}

impl RoleSpec {
    /// A role named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("role", "name", &self.name)?;
        Ok(())
    }
}

/// A user belonging to a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSpec {
    /// User name; the natural key within the tenant.
    #[serde(default)]
    pub name: String,
    /// Name of the owning tenant.
    #[serde(default)]
    pub tenant_name: String,
    /// Desired password.
    #[serde(default)]
    pub password: String,
    /// Whether the user is enabled on creation, `true` unless declared.
    ///
    /// `enabled: false` creates the user disabled. An existing user's
    /// enabled state is never changed.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl UserSpec {
    /// An enabled user.
    pub fn new(
        name: impl Into<String>,
        tenant_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tenant_name: tenant_name.into(),
            password: password.into(),
            enabled: true,
        }
    }

    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("user", "name", &self.name)?;
        required("user", "tenant_name", &self.tenant_name)?;
        required("user", "password", &self.password)?;
        Ok(())
    }
}

/// A role granted to a user within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantSpec {
    /// The user receiving the role.
    #[serde(default)]
    pub user_name: String,
    /// The tenant the grant applies to.
    #[serde(default)]
    pub tenant_name: String,
    /// The role being granted.
    #[serde(default)]
    pub role_name: String,
}

impl RoleGrantSpec {
    /// Grants `role_name` to `user_name` in `tenant_name`.
    pub fn new(
        user_name: impl Into<String>,
        tenant_name: impl Into<String>,
        role_name: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            tenant_name: tenant_name.into(),
            role_name: role_name.into(),
        }
    }

    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("role_grant", "user_name", &self.user_name)?;
        required("role_grant", "tenant_name", &self.tenant_name)?;
        required("role_grant", "role_name", &self.role_name)?;
        Ok(())
    }
}

/// An EC2-style access/secret key pair for a user.
///
/// Keys are issued under an administrative identity, so the descriptor carries
/// admin credentials distinct from the subject user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ec2CredentialSpec {
    /// The user the keys belong to.
    #[serde(default)]
    pub user_name: String,
    /// The tenant the keys are scoped to.
    #[serde(default)]
    pub tenant_name: String,
    /// Tenant of the administrative user.
    #[serde(default)]
    pub admin_tenant_name: String,
    /// Administrative user issuing the keys.
    #[serde(default)]
    pub admin_user: String,
    /// Password of the administrative user.
    #[serde(default)]
    pub admin_password: String,
    /// Identity endpoint the administrative user authenticates against.
    #[serde(default)]
    pub identity_endpoint: String,
}

impl Ec2CredentialSpec {
    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        required("ec2_credential", "user_name", &self.user_name)?;
        required("ec2_credential", "tenant_name", &self.tenant_name)?;
        required("ec2_credential", "admin_tenant_name", &self.admin_tenant_name)?;
        required("ec2_credential", "admin_user", &self.admin_user)?;
        required("ec2_credential", "admin_password", &self.admin_password)?;
        required("ec2_credential", "identity_endpoint", &self.identity_endpoint)?;
        Ok(())
    }
}

/// One declared object of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    /// A tenant.
    Tenant(TenantSpec),
    /// A catalog service.
    Service(ServiceSpec),
    /// A catalog endpoint.
    Endpoint(EndpointSpec),
    /// A role.
    Role(RoleSpec),
    /// A user.
    User(UserSpec),
    /// A role grant.
    RoleGrant(RoleGrantSpec),
    /// An EC2 key pair.
    Ec2Credential(Ec2CredentialSpec),
}

impl Declaration {
    /// The kind tag as written in manifests.
    pub fn kind(&self) -> &'static str {
        match self {
            Declaration::Tenant(_) => "tenant",
            Declaration::Service(_) => "service",
            Declaration::Endpoint(_) => "endpoint",
            Declaration::Role(_) => "role",
            Declaration::User(_) => "user",
            Declaration::RoleGrant(_) => "role_grant",
            Declaration::Ec2Credential(_) => "ec2_credential",
        }
    }

    /// A short human-readable name for reports and logs.
    pub fn label(&self) -> String {
        match self {
            Declaration::Tenant(spec) => spec.name.clone(),
            Declaration::Service(spec) => spec.service_type.clone(),
            Declaration::Endpoint(spec) => format!("{}@{}", spec.service_type, spec.region),
            Declaration::Role(spec) => spec.name.clone(),
            Declaration::User(spec) => format!("{}@{}", spec.name, spec.tenant_name),
            Declaration::RoleGrant(spec) => format!(
                "{}:{}@{}",
                spec.role_name, spec.user_name, spec.tenant_name
            ),
            Declaration::Ec2Credential(spec) => {
                format!("{}@{}", spec.user_name, spec.tenant_name)
            }
        }
    }

    /// Checks that required attributes are present.
    pub fn validate(&self) -> Result<(), RegisterError> {
        match self {
            Declaration::Tenant(spec) => spec.validate(),
            Declaration::Service(spec) => spec.validate(),
            Declaration::Endpoint(spec) => spec.validate(),
            Declaration::Role(spec) => spec.validate(),
            Declaration::User(spec) => spec.validate(),
            Declaration::RoleGrant(spec) => spec.validate(),
            Declaration::Ec2Credential(spec) => spec.validate(),
        }
    }
}
