//! Metadata lookup over contracts, their ancestry and their tags.
//!
//! Single-valued metadata (path, version) takes the most specific
//! declaration; multi-valued metadata (headers, cookies) is the union of every
//! level, outermost first.

use crate::contract::{ContractCatalog, ContractDef, OperationDef};
use crate::error::ContractError;
use crate::metadata::{HeaderTag, Tag, VersionTag};
use crate::operation::OperationKey;

/// Name of the header static cookies are folded into.
pub const COOKIE_HEADER: &str = "Cookie";

#[derive(Debug, Clone, Copy)]
pub struct MetadataScanner<'a> {
    catalog: &'a ContractCatalog,
}

impl<'a> MetadataScanner<'a> {
    #[must_use]
    pub fn new(catalog: &'a ContractCatalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &'a ContractCatalog {
        self.catalog
    }

    /// # Errors
    /// [`ContractError::UnknownContract`] when `name` is not registered.
    pub fn contract(&self, name: &str) -> Result<&'a ContractDef, ContractError> {
        self.catalog.contract(name)
    }

    /// Validate a contract's own declaration and return its parent.
    ///
    /// # Errors
    /// - [`ContractError::MultipleParents`] for more than one parent
    /// - [`ContractError::UnknownParent`] for an unregistered parent
    /// - [`ContractError::MisplacedTag`] for a verb tag on the contract type
    pub fn parent(&self, contract: &ContractDef) -> Result<Option<&'a ContractDef>, ContractError> {
        if let Some(tag) = contract.tags.iter().find(|tag| tag.verb().is_some()) {
            return Err(ContractError::MisplacedTag {
                contract: contract.name.clone(),
                tag: tag.label(),
            });
        }

        match contract.extends.as_slice() {
            [] => Ok(None),
            [parent] => self
                .catalog
                .get(parent)
                .map(Some)
                .ok_or_else(|| ContractError::UnknownParent {
                    contract: contract.name.clone(),
                    parent: parent.clone(),
                }),
            parents => Err(ContractError::MultipleParents {
                contract: contract.name.clone(),
                parents: parents.to_vec(),
            }),
        }
    }

    /// Inheritance chain of `name`, root first and `name` last.
    ///
    /// # Errors
    /// Any [`parent`](Self::parent) error along the chain, or
    /// [`ContractError::InheritanceCycle`].
    pub fn lineage(&self, name: &str) -> Result<Vec<&'a ContractDef>, ContractError> {
        let mut chain = Vec::new();
        let mut current = Some(self.contract(name)?);

        while let Some(contract) = current {
            if chain
                .iter()
                .any(|seen: &&ContractDef| seen.name == contract.name)
            {
                let mut names: Vec<String> =
                    chain.iter().map(|seen| seen.name.clone()).collect();
                names.push(contract.name.clone());
                return Err(ContractError::InheritanceCycle { chain: names });
            }
            current = self.parent(contract)?;
            chain.push(contract);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Every operation callable through `target`, root contract's first.
    ///
    /// An operation redeclared with the same name and signature by a more
    /// derived contract replaces the inherited one in place.
    ///
    /// # Errors
    /// Any [`lineage`](Self::lineage) error.
    pub fn operations(
        &self,
        target: &str,
    ) -> Result<Vec<(&'a ContractDef, &'a OperationDef)>, ContractError> {
        let mut operations: Vec<(&'a ContractDef, &'a OperationDef)> = Vec::new();

        for contract in self.lineage(target)? {
            for operation in &contract.operations {
                let existing = operations.iter_mut().find(|(_, seen)| {
                    seen.name == operation.name && seen.signature() == operation.signature()
                });
                match existing {
                    Some(slot) => *slot = (contract, operation),
                    None => operations.push((contract, operation)),
                }
            }
        }

        Ok(operations)
    }

    /// Find the operation identified by `key`.
    ///
    /// # Errors
    /// [`ContractError::UnknownOperation`] when the key does not name an
    /// operation reachable through its target.
    pub fn find_operation(
        &self,
        key: &OperationKey,
    ) -> Result<(&'a ContractDef, &'a OperationDef), ContractError> {
        self.operations(key.target())?
            .into_iter()
            .find(|(declaring, operation)| {
                declaring.name == key.declaring()
                    && operation.name == key.operation()
                    && operation.signature() == key.signature()
            })
            .ok_or_else(|| ContractError::UnknownOperation {
                contract: key.target().to_owned(),
                operation: key.method_signature(),
            })
    }

    /// First `path` tag.
    #[must_use]
    pub fn path(tags: &[Tag]) -> Option<&str> {
        tags.iter().find_map(|tag| match tag {
            Tag::Path(path) => Some(path.as_str()),
            _ => None,
        })
    }

    /// Version of the first level that declares one.
    ///
    /// Pass levels most specific first.
    #[must_use]
    pub fn version<'t, I>(levels: I) -> Option<&'t VersionTag>
    where
        I: IntoIterator<Item = &'t [Tag]>,
    {
        levels.into_iter().find_map(|tags| {
            tags.iter().find_map(|tag| match tag {
                Tag::Version(version) => Some(version),
                _ => None,
            })
        })
    }

    /// Union of header declarations across levels, outermost first.
    ///
    /// Cookies become `Cookie: name=value` headers. Exact duplicates are
    /// dropped.
    #[must_use]
    pub fn headers<'t, I>(levels: I) -> Vec<HeaderTag>
    where
        I: IntoIterator<Item = &'t [Tag]>,
    {
        let mut headers: Vec<HeaderTag> = Vec::new();
        let mut push = |header: HeaderTag| {
            if !headers.contains(&header) {
                headers.push(header);
            }
        };

        for tags in levels {
            for tag in tags {
                match tag {
                    Tag::Header(header) => push(header.clone()),
                    Tag::Headers(group) => {
                        for header in group {
                            push(header.clone());
                        }
                    }
                    Tag::Cookie(cookie) => push(HeaderTag::new(
                        COOKIE_HEADER,
                        format!("{}={}", cookie.name, cookie.value),
                    )),
                    _ => {}
                }
            }
        }

        headers
    }

    /// Verb-defining tags, in declaration order.
    #[must_use]
    pub fn verbs(tags: &[Tag]) -> Vec<&str> {
        tags.iter().filter_map(Tag::verb).collect()
    }
}
