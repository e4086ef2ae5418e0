//! Layered client configuration.
//!
//! Precedence, lowest first: built-in defaults, the optional YAML file,
//! `RESTKIT__*` environment variables (nested keys split on `__`, e.g.
//! `RESTKIT__ENDPOINTS__USERAPI`). Figment lowercases environment keys, so
//! contract names and property keys set that way must be lowercase.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::ContractCatalog;
use crate::error::ContractError;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RESTKIT__";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid contract catalog {origin}: {reason}")]
    Catalog { origin: String, reason: String },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestkitConfig {
    /// Base endpoint used by contracts without their own entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Per-contract base endpoints
    pub endpoints: BTreeMap<String, String>,
    /// Values for `@{key}` placeholders
    pub properties: BTreeMap<String, String>,
    /// Contract catalog files, relative to the working directory
    pub contracts: Vec<PathBuf>,
}

impl RestkitConfig {
    /// Provider stack for `path` (if any) and the environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from defaults, `path` and the environment.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when `path` does not exist,
    /// [`ConfigError::Figment`] when extraction fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path
            && !path.is_file()
        {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            });
        }
        Self::figment(path).extract().map_err(Box::new).map_err(ConfigError::from)
    }

    /// Base endpoint for `contract`, falling back to the default.
    #[must_use]
    pub fn endpoint_for(&self, contract: &str) -> Option<&str> {
        self.endpoints
            .get(contract)
            .or(self.endpoint.as_ref())
            .map(String::as_str)
    }

    /// Load and merge every configured catalog file, in order.
    ///
    /// # Errors
    /// I/O and parse failures, or the same contract name in two files.
    pub fn load_catalog(&self) -> Result<ContractCatalog, ConfigError> {
        let mut catalog = ContractCatalog::new();
        for path in &self.contracts {
            catalog.extend(ContractCatalog::load_yaml(path)?)?;
        }
        Ok(catalog)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(["RESTKIT__ENDPOINT"], || {
            let config = RestkitConfig::load(None).unwrap();
            assert_eq!(config, RestkitConfig::default());
        });
    }

    #[test]
    fn test_endpoint_for_falls_back_to_default() {
        let config = RestkitConfig {
            endpoint: Some("http://default".to_owned()),
            endpoints: BTreeMap::from([("UserApi".to_owned(), "http://users".to_owned())]),
            ..RestkitConfig::default()
        };
        assert_eq!(config.endpoint_for("UserApi"), Some("http://users"));
        assert_eq!(config.endpoint_for("Other"), Some("http://default"));
        assert_eq!(RestkitConfig::default().endpoint_for("UserApi"), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RestkitConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
