//! Configuration for talking to the identity service.
//!
//! This module describes which tool to run, how to authenticate it, and which
//! catalog backend the identity service uses. Configuration can be written as
//! YAML or JSON:
//!
//! ```yaml
//! tool: keystone
//! insecure: true
//! catalog_backend: sql
//! service_endpoint: http://127.0.0.1:35357/v2.0
//! service_token: ADMIN
//! auth_uri: http://127.0.0.1:5000/v2.0
//! ```

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LoadError;
use crate::invoker::{SERVICE_ENDPOINT_VAR, SERVICE_TOKEN_VAR};

/// The storage backend of the identity service's catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Services and endpoints live in the database and can be managed.
    #[default]
    Sql,
    /// Services and endpoints come from a template file and cannot be managed.
    Templated,
    /// Services and endpoints live in a key-value store and can be managed.
    Kvs,
}

impl CatalogBackend {
    /// Returns true if services and endpoints can be created through the tool.
    pub fn supports_dynamic_services(&self) -> bool {
        !matches!(self, CatalogBackend::Templated)
    }
}

impl std::fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogBackend::Sql => write!(f, "sql"),
            CatalogBackend::Templated => write!(f, "templated"),
            CatalogBackend::Kvs => write!(f, "kvs"),
        }
    }
}

impl FromStr for CatalogBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" => Ok(CatalogBackend::Sql),
            "templated" => Ok(CatalogBackend::Templated),
            "kvs" => Ok(CatalogBackend::Kvs),
            _ => Err(format!(
                "Invalid catalog backend '{}'. Valid options: sql, templated, kvs",
                s
            )),
        }
    }
}

/// How to run the administration tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Program to run, looked up on `PATH` unless it is a path.
    pub tool: String,
    /// Pass `--insecure` to skip TLS certificate verification.
    pub insecure: bool,
    /// Catalog backend of the identity service.
    pub catalog_backend: CatalogBackend,
    /// Admin endpoint the bootstrap token is valid for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<String>,
    /// Bootstrap service token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
    /// Endpoint users authenticate against; defaults to `service_endpoint`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_uri: Option<String>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            tool: "keystone".to_string(),
            insecure: true,
            catalog_backend: CatalogBackend::default(),
            service_endpoint: None,
            service_token: None,
            auth_uri: None,
        }
    }
}

impl RegisterConfig {
    /// Loads configuration from a YAML or JSON file.
    ///
    /// Fields absent from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        serde_yml::from_str(&content).map_err(|e| LoadError::syntax(&path.display().to_string(), e))
    }

    /// Fills unset service credentials from the process environment.
    pub fn with_environment(self) -> Self {
        self.with_lookup(|name| std::env::var(name).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.service_endpoint.is_none() {
            self.service_endpoint = lookup(SERVICE_ENDPOINT_VAR);
        }
        if self.service_token.is_none() {
            self.service_token = lookup(SERVICE_TOKEN_VAR);
        }
        self
    }

    /// The endpoint users authenticate against.
    pub fn auth_uri(&self) -> Option<&str> {
        self.auth_uri
            .as_deref()
            .or(self.service_endpoint.as_deref())
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
