use tracing::{debug, info, warn};

use crate::reconcile::{Outcome, Reconcile};
use crate::{Credentials, Identity, Lookup, Options, RegisterError, Subject, UserSpec};

/// Creates users and keeps their passwords current.
///
/// Passwords cannot be read back from the service, so an existing user's
/// password is checked by asking for a token with it. If that fails the
/// password is reset to the declared one.
///
/// New users are created enabled unless the descriptor says `enabled: false`,
/// in which case they are created disabled.
pub struct UserReconciler<'a> {
    identity: &'a Identity,
}

impl<'a> UserReconciler<'a> {
    /// Creates a user reconciler.
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }

    fn credentials(&self, user: &UserSpec) -> Result<Credentials, RegisterError> {
        let auth_url = self
            .identity
            .invoker()
            .auth_uri()
            .ok_or(RegisterError::MissingAttribute {
                kind: "configuration",
                attribute: "auth_uri",
            })?;
        Ok(Credentials {
            username: user.name.clone(),
            password: user.password.clone(),
            tenant_name: user.tenant_name.clone(),
            auth_url: auth_url.to_string(),
        })
    }
}

impl Reconcile for UserReconciler<'_> {
    type Descriptor = UserSpec;

    fn ensure(&self, user: &UserSpec) -> Result<Outcome, RegisterError> {
        user.validate()?;

        let tenant_id = self
            .identity
            .require_id(&Lookup::new("tenant", "name", &user.tenant_name))?;
        let users = self
            .identity
            .list("user", &Options::new().with("tenant-id", &tenant_id))?;

        if users.find("name", &user.name).is_none() {
            let options = Options::new()
                .with("name", &user.name)
                .with("tenant-id", &tenant_id)
                .with("pass", &user.password)
                .with("enabled", user.enabled);
            self.identity.change("user-create", &options)?;
            info!(user = %user.name, tenant = %user.tenant_name, "created user");
            return Ok(Outcome::Created);
        }

        let as_user = Subject::User(self.credentials(user)?);
        match self.identity.run_as("token-get", &Options::new(), &as_user) {
            Ok(_) => {
                debug!(user = %user.name, "user already exists with the declared password");
                Ok(Outcome::Unchanged)
            }
            Err(err) => {
                warn!(user = %user.name, exit_code = ?err.exit_code, "token request failed, updating password");
                let options = Options::new()
                    .with("pass", &user.password)
                    .positional(&user.name);
                self.identity.change("user-password-update", &options)?;
                info!(user = %user.name, "updated user password");
                Ok(Outcome::PasswordUpdated)
            }
        }
    }
}
