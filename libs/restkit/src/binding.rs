//! Parameter binding resolution.
//!
//! Every operation parameter is classified into exactly one [`BindingKind`]
//! from its tags; untagged parameters default to PATH. The resolved
//! [`ParameterBinding`] carries the effective name and serializer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::contract::ParameterDef;
use crate::error::ContractError;
use crate::metadata::ParameterTag;
use crate::operation::OperationKey;
use crate::serializer::{ParameterSerializer, SerializerRegistry};
use crate::types::TypeDescriptor;

/// Where a parameter's argument ends up in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingKind {
    Path,
    Header,
    Body,
    Query,
    Cookie,
    Callback,
}

impl BindingKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "PATH",
            Self::Header => "HEADER",
            Self::Body => "BODY",
            Self::Query => "QUERY",
            Self::Cookie => "COOKIE",
            Self::Callback => "CALLBACK",
        }
    }

    /// Kinds whose values are addressed by name.
    #[must_use]
    pub fn requires_name(self) -> bool {
        matches!(self, Self::Path | Self::Header | Self::Query | Self::Cookie)
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved binding of one operation parameter.
#[derive(Clone)]
pub struct ParameterBinding {
    position: usize,
    name: Option<String>,
    kind: BindingKind,
    aggregate: bool,
    serializer: Option<Arc<dyn ParameterSerializer>>,
    value_type: TypeDescriptor,
}

impl ParameterBinding {
    /// Zero-based index in the operation signature.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Effective name; `None` only for aggregate, body and callback bindings.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// True for query-map bindings that expand an object into many pairs.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    #[must_use]
    pub fn serializer(&self) -> Option<&Arc<dyn ParameterSerializer>> {
        self.serializer.as_ref()
    }

    #[must_use]
    pub fn value_type(&self) -> &TypeDescriptor {
        &self.value_type
    }

    /// Render `value` with this binding's serializer.
    ///
    /// Returns `None` for null values and for bindings without a serializer.
    #[must_use]
    pub fn serialize(&self, value: &Value) -> Option<String> {
        if value.is_null() {
            return None;
        }
        self.serializer
            .as_ref()
            .map(|serializer| serializer.serialize(self.name.as_deref().unwrap_or_default(), value))
    }
}

impl fmt::Debug for ParameterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinding")
            .field("position", &self.position)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("aggregate", &self.aggregate)
            .field(
                "serializer",
                &self.serializer.as_ref().map(|serializer| serializer.name()),
            )
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// Classifies operation parameters into bindings.
#[derive(Debug, Clone, Copy)]
pub struct ParameterBindingResolver<'a> {
    serializers: &'a SerializerRegistry,
}

impl<'a> ParameterBindingResolver<'a> {
    #[must_use]
    pub fn new(serializers: &'a SerializerRegistry) -> Self {
        Self { serializers }
    }

    /// Resolve the binding of a single parameter.
    ///
    /// The name comes from the tag's non-blank override, then from the
    /// declared parameter name.
    ///
    /// # Errors
    /// - [`ContractError::ConflictingParameterTags`] when more than one
    ///   binding tag is present
    /// - [`ContractError::UnresolvedParameterName`] when a named kind has no
    ///   usable name
    /// - [`ContractError::UnknownSerializer`] for an unregistered serializer
    pub fn resolve(
        &self,
        operation: &OperationKey,
        position: usize,
        parameter: &ParameterDef,
    ) -> Result<ParameterBinding, ContractError> {
        let tag = match parameter.tags.as_slice() {
            [] => None,
            [tag] => Some(tag),
            tags => {
                return Err(ContractError::ConflictingParameterTags {
                    operation: operation.clone(),
                    position,
                    tags: tags.iter().map(ParameterTag::label).collect(),
                });
            }
        };

        let kind = tag.map_or(BindingKind::Path, ParameterTag::kind);
        let aggregate = matches!(tag, Some(ParameterTag::QueryMap(_)));

        let name = tag
            .and_then(ParameterTag::explicit_name)
            .or_else(|| parameter.declared_name())
            .map(str::to_owned);

        if name.is_none() && kind.requires_name() && !aggregate {
            return Err(ContractError::UnresolvedParameterName {
                operation: operation.clone(),
                position,
                kind,
            });
        }

        let serializer = self.serializer(
            operation,
            position,
            tag.and_then(ParameterTag::serializer),
            kind,
            aggregate,
        )?;

        Ok(ParameterBinding {
            position,
            name,
            kind,
            aggregate,
            serializer,
            value_type: parameter.value_type.clone(),
        })
    }

    /// Resolve every parameter of an operation, in signature order.
    ///
    /// # Errors
    /// Everything [`resolve`](Self::resolve) raises, plus
    /// [`ContractError::MultipleBodyParameters`] and
    /// [`ContractError::DuplicateCallback`].
    pub fn resolve_all(
        &self,
        operation: &OperationKey,
        parameters: &[ParameterDef],
    ) -> Result<Vec<ParameterBinding>, ContractError> {
        let mut bindings = Vec::with_capacity(parameters.len());
        let mut body: Option<usize> = None;
        let mut callbacks: HashMap<&TypeDescriptor, usize> = HashMap::new();

        for (position, parameter) in parameters.iter().enumerate() {
            let binding = self.resolve(operation, position, parameter)?;
            match binding.kind {
                BindingKind::Body => {
                    if let Some(first) = body {
                        return Err(ContractError::MultipleBodyParameters {
                            operation: operation.clone(),
                            first,
                            second: position,
                        });
                    }
                    body = Some(position);
                }
                BindingKind::Callback => {
                    if callbacks.insert(&parameter.value_type, position).is_some() {
                        return Err(ContractError::DuplicateCallback {
                            operation: operation.clone(),
                            value_type: parameter.value_type.clone(),
                        });
                    }
                }
                BindingKind::Path | BindingKind::Header | BindingKind::Query | BindingKind::Cookie => {}
            }
            bindings.push(binding);
        }

        Ok(bindings)
    }

    fn serializer(
        &self,
        operation: &OperationKey,
        position: usize,
        explicit: Option<&str>,
        kind: BindingKind,
        aggregate: bool,
    ) -> Result<Option<Arc<dyn ParameterSerializer>>, ContractError> {
        let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(self.serializers.default_for(kind, aggregate));
        };

        let serializer =
            self.serializers
                .get(name)
                .ok_or_else(|| ContractError::UnknownSerializer {
                    operation: operation.clone(),
                    position,
                    serializer: name.to_owned(),
                })?;

        if serializer.supports(kind) {
            Ok(Some(serializer))
        } else {
            debug!(
                operation = %operation,
                position,
                serializer = name,
                kind = %kind,
                "serializer does not support binding kind, using default"
            );
            Ok(self.serializers.default_for(kind, aggregate))
        }
    }
}
