//! Declarative input: a list of identity objects to reconcile.
//!
//! ```yaml
//! objects:
//!   - kind: tenant
//!     name: service
//!     description: Service Tenant
//!   - kind: user
//!     name: nova
//!     tenant_name: service
//!     password: secrete
//!   - kind: role_grant
//!     user_name: nova
//!     tenant_name: service
//!     role_name: admin
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::read_file;
use crate::{Declaration, LoadError, RegisterError};

/// Objects to reconcile, in the order they are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// The declared objects.
    #[serde(default)]
    pub objects: Vec<Declaration>,
}

impl Manifest {
    /// Loads a manifest from a YAML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parses a manifest; `source` names it in errors.
    pub fn from_yaml(content: &str, source: &str) -> Result<Self, LoadError> {
        serde_yml::from_str(content).map_err(|e| LoadError::syntax(source, e))
    }

    /// Checks every object's required attributes without contacting the service.
    ///
    /// Returns the index of the first invalid object with its error.
    pub fn validate(&self) -> Result<(), (usize, RegisterError)> {
        for (index, declaration) in self.objects.iter().enumerate() {
            declaration.validate().map_err(|err| (index, err))?;
        }
        Ok(())
    }
}
