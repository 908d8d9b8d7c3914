use tracing::{debug, info};

use crate::reconcile::{Ec2KeyPair, Outcome, Reconcile};
use crate::{Credentials, Ec2CredentialSpec, Identity, Lookup, Options, RegisterError, Subject};

/// Issues EC2 key pairs for users that have none in the given tenant.
///
/// Existing key pairs are left alone and their secrets are never read back.
/// Keys are issued under the administrative identity named by the descriptor.
pub struct Ec2CredentialReconciler<'a> {
    identity: &'a Identity,
}

impl<'a> Ec2CredentialReconciler<'a> {
    /// Creates an EC2 credential reconciler.
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }
}

fn admin(credential: &Ec2CredentialSpec) -> Subject {
    Subject::Admin(Credentials {
        username: credential.admin_user.clone(),
        password: credential.admin_password.clone(),
        tenant_name: credential.admin_tenant_name.clone(),
        auth_url: credential.identity_endpoint.clone(),
    })
}

impl Reconcile for Ec2CredentialReconciler<'_> {
    type Descriptor = Ec2CredentialSpec;

    fn ensure(&self, credential: &Ec2CredentialSpec) -> Result<Outcome, RegisterError> {
        credential.validate()?;

        let tenant_id = self
            .identity
            .require_id(&Lookup::new("tenant", "name", &credential.tenant_name))?;
        let user_id = self.identity.require_id(
            &Lookup::new("user", "name", &credential.user_name)
                .args(Options::new().with("tenant-id", &tenant_id)),
        )?;

        let existing = Lookup::new("ec2-credentials", "tenant", &credential.tenant_name)
            .args(Options::new().with("user-id", &user_id))
            .id_column("access");
        if self.identity.find_id(&existing)?.is_some() {
            debug!(user = %credential.user_name, tenant = %credential.tenant_name, "ec2 credentials already exist");
            return Ok(Outcome::Unchanged);
        }

        const VERB: &str = "ec2-credentials-create";
        let options = Options::new()
            .with("user-id", &user_id)
            .with("tenant-id", &tenant_id);
        let stdout = self
            .identity
            .change_as(VERB, &options, &admin(credential))?;
        let rows = self.identity.parse(&stdout)?;
        let row = rows.first();
        let field = |name: &'static str| {
            row.and_then(|row| row.get(name))
                .map(str::to_string)
                .ok_or(RegisterError::MissingField {
                    verb: VERB,
                    field: name,
                })
        };
        let keys = Ec2KeyPair {
            access: field("access")?,
            secret: field("secret")?,
        };
        info!(user = %credential.user_name, tenant = %credential.tenant_name, access = %keys.access, "issued ec2 credentials");
        Ok(Outcome::Issued(keys))
    }
}
