//! Immutable endpoint descriptors and the builder that composes them.

use http::{HeaderName, Method};
use restkit_uri::join_paths;
use serde_json::{Value, json};
use tracing::debug;

use crate::binding::{BindingKind, ParameterBinding, ParameterBindingResolver};
use crate::contract::{ContractCatalog, ContractDef, OperationDef};
use crate::error::{ContractError, ExpansionError};
use crate::expand;
use crate::expression::ExpressionResolver;
use crate::metadata::HeaderTag;
use crate::operation::{OperationKey, OperationModel};
use crate::request::EndpointRequest;
use crate::scanner::MetadataScanner;
use crate::serializer::SerializerRegistry;
use crate::type_model::ContractTypeModel;
use crate::types::TypeDescriptor;

/// A header whose value may be a `{param}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointHeader {
    name: String,
    value: String,
}

impl EndpointHeader {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value template.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<HeaderTag> for EndpointHeader {
    fn from(tag: HeaderTag) -> Self {
        Self::new(tag.name, tag.value)
    }
}

/// Contract an operation is invoked through, plus its base endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointTarget {
    contract: String,
    endpoint: Option<String>,
}

impl EndpointTarget {
    #[must_use]
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            endpoint: None,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Base endpoint, before expression resolution.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

/// Immutable model of one operation's request shape.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    key: OperationKey,
    method: Method,
    path: String,
    version: Option<String>,
    headers: Vec<EndpointHeader>,
    parameters: Vec<ParameterBinding>,
    return_type: TypeDescriptor,
    runnable_async: bool,
}

impl EndpointDescriptor {
    #[must_use]
    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template, base endpoint included.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Version reported to callers; only URI-flagged versions are reported.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Contract headers first, then operation headers.
    #[must_use]
    pub fn headers(&self) -> &[EndpointHeader] {
        &self.headers
    }

    /// Bindings in signature order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterBinding] {
        &self.parameters
    }

    /// Bindings of one kind, in signature order.
    pub fn bindings(&self, kind: BindingKind) -> impl Iterator<Item = &ParameterBinding> {
        self.parameters
            .iter()
            .filter(move |binding| binding.kind() == kind)
    }

    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// True when the operation returns nothing and reports through a callback.
    #[must_use]
    pub fn is_runnable_async(&self) -> bool {
        self.runnable_async
    }

    /// Expand into a concrete request.
    ///
    /// `args` holds one value per parameter, in signature order.
    ///
    /// # Errors
    /// See [`ExpansionError`].
    pub fn expand(&self, args: &[Value]) -> Result<EndpointRequest, ExpansionError> {
        expand::expand(self, args)
    }

    /// JSON view for logs and tooling.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let headers: Vec<Value> = self
            .headers
            .iter()
            .map(|header| json!({ "name": header.name, "value": header.value }))
            .collect();
        let parameters: Vec<Value> = self
            .parameters
            .iter()
            .map(|binding| {
                json!({
                    "position": binding.position(),
                    "name": binding.name(),
                    "kind": binding.kind(),
                    "serializer": binding.serializer().map(|serializer| serializer.name()),
                    "type": binding.value_type().as_str(),
                })
            })
            .collect();

        json!({
            "operation": self.key.to_string(),
            "method": self.method.as_str(),
            "path": self.path,
            "version": self.version,
            "headers": headers,
            "parameters": parameters,
            "returns": self.return_type.as_str(),
            "async": self.runnable_async,
        })
    }
}

/// Composes contract and operation models into descriptors.
#[derive(Clone, Copy)]
pub struct EndpointDescriptorBuilder<'a> {
    scanner: MetadataScanner<'a>,
    serializers: &'a SerializerRegistry,
    expressions: &'a dyn ExpressionResolver,
}

impl<'a> EndpointDescriptorBuilder<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a ContractCatalog,
        serializers: &'a SerializerRegistry,
        expressions: &'a dyn ExpressionResolver,
    ) -> Self {
        Self {
            scanner: MetadataScanner::new(catalog),
            serializers,
            expressions,
        }
    }

    /// Build the descriptor of the operation identified by `key`.
    ///
    /// # Errors
    /// Any [`ContractError`] raised while validating the contract chain, the
    /// operation or its parameters.
    pub fn build_key(
        &self,
        target: &EndpointTarget,
        key: &OperationKey,
    ) -> Result<EndpointDescriptor, ContractError> {
        let (declaring, operation) = self.scanner.find_operation(key)?;
        self.build(target, declaring, operation)
    }

    /// Build the descriptor of `operation`, declared by `declaring` and
    /// invoked through `target`.
    ///
    /// # Errors
    /// Any [`ContractError`] raised while validating the contract chain, the
    /// operation or its parameters.
    pub fn build(
        &self,
        target: &EndpointTarget,
        declaring: &ContractDef,
        operation: &OperationDef,
    ) -> Result<EndpointDescriptor, ContractError> {
        let type_model = ContractTypeModel::resolve(&self.scanner, target.contract())?;
        let key = OperationKey::of(target.contract(), declaring, operation);
        let model = OperationModel::resolve(
            key,
            operation,
            &ParameterBindingResolver::new(self.serializers),
        )?;

        let path = self.path(target, &type_model, &model);
        let version = Self::reported_version(&type_model, &model);
        let headers = Self::headers(&type_model, &model)?;
        let (key, method, parameters, return_type) = model.into_parts();

        let runnable_async = return_type.is_void()
            && parameters
                .iter()
                .any(|binding| binding.kind() == BindingKind::Callback);

        debug!(
            operation = %key,
            method = %method,
            path = %path,
            parameters = parameters.len(),
            "built endpoint descriptor"
        );

        Ok(EndpointDescriptor {
            key,
            method,
            path,
            version,
            headers,
            parameters,
            return_type,
            runnable_async,
        })
    }

    /// Base endpoint, contract chain, version segment, operation path.
    fn path(
        &self,
        target: &EndpointTarget,
        type_model: &ContractTypeModel,
        model: &OperationModel,
    ) -> String {
        let base = target
            .endpoint()
            .map(|endpoint| self.expressions.resolve(endpoint));
        let contract_paths: Vec<String> = type_model
            .paths()
            .into_iter()
            .map(|path| self.expressions.resolve(path))
            .collect();
        let version = match model.version() {
            Some(version) => Some(version.value.as_str()),
            None => type_model
                .version()
                .filter(|version| version.uri)
                .map(|version| version.value.as_str()),
        };

        join_paths(
            base.iter()
                .map(String::as_str)
                .chain(contract_paths.iter().map(String::as_str))
                .chain(version)
                .chain(model.path()),
        )
    }

    fn reported_version(type_model: &ContractTypeModel, model: &OperationModel) -> Option<String> {
        model
            .version()
            .filter(|version| version.uri)
            .or_else(|| type_model.version().filter(|version| version.uri))
            .map(|version| version.value.clone())
    }

    fn headers(
        type_model: &ContractTypeModel,
        model: &OperationModel,
    ) -> Result<Vec<EndpointHeader>, ContractError> {
        let mut headers: Vec<EndpointHeader> = Vec::new();
        for tag in type_model
            .headers()
            .into_iter()
            .chain(model.headers().iter().cloned())
        {
            if HeaderName::from_bytes(tag.name.as_bytes()).is_err() {
                return Err(ContractError::InvalidHeaderName {
                    operation: model.key().clone(),
                    name: tag.name,
                });
            }
            let header = EndpointHeader::from(tag);
            if !headers.contains(&header) {
                headers.push(header);
            }
        }
        Ok(headers)
    }
}
