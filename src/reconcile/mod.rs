//! # Object Reconcilers
//!
//! One reconciler per kind of identity-service object. Each one looks the
//! object up by its natural key, decides whether anything needs to change, and
//! issues the commands that converge it:
//!
//! | kind            | natural key           | when present                              |
//! |-----------------|-----------------------|-------------------------------------------|
//! | tenant          | name                  | left alone                                |
//! | service         | type                  | replaced if name/description differ       |
//! | endpoint        | service_id            | replaced if region/URLs differ            |
//! | role            | name                  | left alone                                |
//! | user            | name within tenant    | password updated if a token request fails |
//! | role grant      | role name within user | left alone                                |
//! | ec2 credentials | tenant within user    | left alone, secrets are not re-read       |
//!
//! Every lookup re-queries the service. Any command failure aborts the object
//! being reconciled and is returned as is.

mod ec2_credential;
mod endpoint;
mod role;
mod role_grant;
mod service;
mod tenant;
mod user;

pub use ec2_credential::Ec2CredentialReconciler;
pub use endpoint::EndpointReconciler;
pub use role::RoleReconciler;
pub use role_grant::RoleGrantReconciler;
pub use service::ServiceReconciler;
pub use tenant::TenantReconciler;
pub use user::UserReconciler;

use serde::Serialize;

use crate::RegisterError;

/// An issued EC2 access/secret key pair.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Ec2KeyPair {
    /// Access key.
    pub access: String,
    /// Secret key.
    pub secret: String,
}

impl std::fmt::Debug for Ec2KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ec2KeyPair")
            .field("access", &self.access)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// What reconciling one object did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    /// The object did not exist and was created.
    Created,
    /// The object differed and was deleted and created again.
    Replaced,
    /// The user's password no longer worked and was reset.
    PasswordUpdated,
    /// The role was granted.
    Granted,
    /// A key pair was issued.
    Issued(Ec2KeyPair),
    /// The object already matched; no command was issued.
    Unchanged,
    /// The catalog backend does not allow managing this object.
    Skipped,
}

impl Outcome {
    /// Returns true if a state-changing command was issued.
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged | Outcome::Skipped)
    }
}

/// Converges one kind of object.
pub trait Reconcile {
    /// The desired state of the object.
    type Descriptor;

    /// Makes the identity service match `descriptor`.
    fn ensure(&self, descriptor: &Self::Descriptor) -> Result<Outcome, RegisterError>;
}
