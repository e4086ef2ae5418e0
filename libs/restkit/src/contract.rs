//! Declarative contract definitions and the catalog that holds them.
//!
//! A contract is a named group of operations with shared metadata. It may
//! extend at most one parent contract. Catalogs are usually loaded from YAML:
//!
//! ```yaml
//! contracts:
//!   - name: UserApi
//!     tags:
//!       - path: /users
//!     operations:
//!       - name: find
//!         tags: [get, { path: "/{id}" }]
//!         parameters:
//!           - { name: id, type: String }
//!         returns: User
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::ContractError;
use crate::metadata::{ParameterTag, Tag};
use crate::types::TypeDescriptor;

/// One declared operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDef {
    /// Declared name; may be absent when the parameter is only positional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default = "TypeDescriptor::any")]
    pub value_type: TypeDescriptor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ParameterTag>,
}

impl ParameterDef {
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: Some(name.into()),
            value_type: value_type.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn unnamed(value_type: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: None,
            value_type: value_type.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: ParameterTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Declared name when present and non-blank.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// One declared operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDef>,
    #[serde(default)]
    pub returns: TypeDescriptor,
}

impl OperationDef {
    /// Untagged operation returning `void`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            parameters: Vec::new(),
            returns: TypeDescriptor::void(),
        }
    }

    #[must_use]
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).tag(Tag::Get).tag(Tag::Path(path.into()))
    }

    #[must_use]
    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).tag(Tag::Post).tag(Tag::Path(path.into()))
    }

    #[must_use]
    pub fn put(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).tag(Tag::Put).tag(Tag::Path(path.into()))
    }

    #[must_use]
    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).tag(Tag::Delete).tag(Tag::Path(path.into()))
    }

    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn param(mut self, parameter: ParameterDef) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn returns(mut self, returns: impl Into<TypeDescriptor>) -> Self {
        self.returns = returns.into();
        self
    }

    /// Parameter types in declaration order.
    #[must_use]
    pub fn signature(&self) -> Vec<TypeDescriptor> {
        self.parameters
            .iter()
            .map(|parameter| parameter.value_type.clone())
            .collect()
    }
}

/// A named contract type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDef {
    pub name: String,
    /// Parent contracts; more than one is rejected when descriptors are built
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<OperationDef>,
}

impl ContractDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            tags: Vec::new(),
            operations: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn operation(mut self, operation: OperationDef) -> Self {
        self.operations.push(operation);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default)]
    contracts: Vec<ContractDef>,
}

/// Registered contracts, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractCatalog {
    contracts: BTreeMap<String, ContractDef>,
}

impl ContractCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract.
    ///
    /// # Errors
    /// [`ContractError::DuplicateContract`] when the name is taken.
    pub fn register(&mut self, contract: ContractDef) -> Result<(), ContractError> {
        if self.contracts.contains_key(&contract.name) {
            return Err(ContractError::DuplicateContract(contract.name));
        }
        self.contracts.insert(contract.name.clone(), contract);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    ///
    /// # Errors
    /// [`ContractError::DuplicateContract`] when the name is taken.
    pub fn with(mut self, contract: ContractDef) -> Result<Self, ContractError> {
        self.register(contract)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContractDef> {
        self.contracts.get(name)
    }

    /// Look up a contract by name.
    ///
    /// # Errors
    /// [`ContractError::UnknownContract`] when it is not registered.
    pub fn contract(&self, name: &str) -> Result<&ContractDef, ContractError> {
        self.get(name)
            .ok_or_else(|| ContractError::UnknownContract(name.to_owned()))
    }

    /// Contracts in name order.
    pub fn contracts(&self) -> impl Iterator<Item = &ContractDef> {
        self.contracts.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Merge every contract of `other` into this catalog.
    ///
    /// # Errors
    /// [`ContractError::DuplicateContract`] on the first name clash.
    pub fn extend(&mut self, other: Self) -> Result<(), ContractError> {
        other
            .contracts
            .into_values()
            .try_for_each(|contract| self.register(contract))
    }

    /// Parse a YAML catalog document.
    ///
    /// # Errors
    /// [`ConfigError::Catalog`] for malformed YAML or duplicate names.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(text, "<inline>")
    }

    /// Load a YAML catalog document from disk.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Catalog`] when it does not parse.
    pub fn load_yaml(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_yaml(&text, &path.display().to_string())
    }

    fn parse_yaml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let document: CatalogDocument =
            serde_saphyr::from_str(text).map_err(|e| ConfigError::Catalog {
                origin: origin.to_owned(),
                reason: e.to_string(),
            })?;

        let mut catalog = Self::new();
        for contract in document.contracts {
            catalog
                .register(contract)
                .map_err(|e| ConfigError::Catalog {
                    origin: origin.to_owned(),
                    reason: e.to_string(),
                })?;
        }
        Ok(catalog)
    }
}
