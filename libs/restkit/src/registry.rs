use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::cache::DescriptorCache;
use crate::config::RestkitConfig;
use crate::contract::ContractCatalog;
use crate::descriptor::{EndpointDescriptor, EndpointDescriptorBuilder, EndpointTarget};
use crate::error::{ContractError, Error};
use crate::expression::{
    Chain, EnvPropertySource, ExpressionResolver, IdentityExpressionResolver,
    PropertyExpressionResolver,
};
use crate::operation::OperationKey;
use crate::request::EndpointRequest;
use crate::scanner::MetadataScanner;
use crate::serializer::{ParameterSerializer, SerializerRegistry};

/// Entry point tying a contract catalog to endpoints and the descriptor cache.
///
/// Built once per client; descriptors are created lazily and shared.
pub struct EndpointRegistry {
    catalog: ContractCatalog,
    serializers: SerializerRegistry,
    expressions: Arc<dyn ExpressionResolver>,
    default_endpoint: Option<String>,
    endpoints: BTreeMap<String, String>,
    keys: DashMap<(String, String), OperationKey>,
    cache: DescriptorCache,
}

impl EndpointRegistry {
    #[must_use]
    pub fn builder(catalog: ContractCatalog) -> EndpointRegistryBuilder {
        EndpointRegistryBuilder::new(catalog)
    }

    /// Registry using the endpoints and properties of `config`.
    ///
    /// `@{key}` placeholders resolve from the configured properties, then
    /// from the process environment.
    #[must_use]
    pub fn from_config(config: &RestkitConfig, catalog: ContractCatalog) -> Self {
        let mut builder = Self::builder(catalog).expression_resolver(Arc::new(
            PropertyExpressionResolver::new(Chain::new(
                config.properties.clone(),
                EnvPropertySource,
            )),
        ));
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        for (contract, endpoint) in &config.endpoints {
            builder = builder.contract_endpoint(contract.as_str(), endpoint.as_str());
        }
        builder.build()
    }

    #[must_use]
    pub fn catalog(&self) -> &ContractCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    /// Target for `contract` with its configured base endpoint.
    #[must_use]
    pub fn target(&self, contract: &str) -> EndpointTarget {
        let target = EndpointTarget::new(contract);
        match self
            .endpoints
            .get(contract)
            .or(self.default_endpoint.as_ref())
        {
            Some(endpoint) => target.with_endpoint(endpoint.as_str()),
            None => target,
        }
    }

    /// Key of the operation named `operation` reachable through `contract`.
    ///
    /// # Errors
    /// [`ContractError::UnknownOperation`] when there is none,
    /// [`ContractError::AmbiguousOperation`] when the name is overloaded.
    pub fn operation_key(&self, contract: &str, operation: &str) -> Result<OperationKey, ContractError> {
        let scanner = MetadataScanner::new(&self.catalog);
        let mut matches = scanner
            .operations(contract)?
            .into_iter()
            .filter(|(_, candidate)| candidate.name == operation);

        let Some((declaring, found)) = matches.next() else {
            return Err(ContractError::UnknownOperation {
                contract: contract.to_owned(),
                operation: operation.to_owned(),
            });
        };
        if matches.next().is_some() {
            return Err(ContractError::AmbiguousOperation {
                contract: contract.to_owned(),
                operation: operation.to_owned(),
            });
        }

        Ok(OperationKey::of(contract, declaring, found))
    }

    /// Descriptor of `operation` invoked through `contract`.
    ///
    /// The name lookup runs once per pair; failed lookups are retried.
    ///
    /// # Errors
    /// Lookup errors of [`operation_key`](Self::operation_key) and any build
    /// error.
    pub fn descriptor(
        &self,
        contract: &str,
        operation: &str,
    ) -> Result<Arc<EndpointDescriptor>, ContractError> {
        let lookup = (contract.to_owned(), operation.to_owned());
        let cached = self.keys.get(&lookup).map(|entry| entry.value().clone());
        if let Some(key) = cached {
            return self.descriptor_for(&key);
        }

        let key = self.operation_key(contract, operation)?;
        let descriptor = self.descriptor_for(&key)?;
        self.keys.insert(lookup, key);
        Ok(descriptor)
    }

    /// Descriptor for `key`, built on first use.
    ///
    /// # Errors
    /// Any [`ContractError`] raised while building; failures are not cached.
    pub fn descriptor_for(&self, key: &OperationKey) -> Result<Arc<EndpointDescriptor>, ContractError> {
        self.cache.get_or_try_insert_with(key, || {
            EndpointDescriptorBuilder::new(&self.catalog, &self.serializers, self.expressions.as_ref())
                .build_key(&self.target(key.target()), key)
        })
    }

    /// Descriptors of every operation callable through `contract`.
    ///
    /// # Errors
    /// The first build error encountered.
    pub fn descriptors(&self, contract: &str) -> Result<Vec<Arc<EndpointDescriptor>>, ContractError> {
        MetadataScanner::new(&self.catalog)
            .operations(contract)?
            .into_iter()
            .map(|(declaring, operation)| {
                self.descriptor_for(&OperationKey::of(contract, declaring, operation))
            })
            .collect()
    }

    /// Build (or fetch) the descriptor and expand it against `args`.
    ///
    /// # Errors
    /// [`Error::Contract`] for build failures, [`Error::Expansion`] for
    /// argument problems.
    pub fn request(
        &self,
        contract: &str,
        operation: &str,
        args: &[Value],
    ) -> Result<EndpointRequest, Error> {
        let descriptor = self.descriptor(contract, operation)?;
        Ok(descriptor.expand(args)?)
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("contracts", &self.catalog.len())
            .field("serializers", &self.serializers)
            .field("default_endpoint", &self.default_endpoint)
            .field("endpoints", &self.endpoints)
            .field("keys", &self.keys.len())
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`EndpointRegistry`].
pub struct EndpointRegistryBuilder {
    catalog: ContractCatalog,
    serializers: SerializerRegistry,
    expressions: Option<Arc<dyn ExpressionResolver>>,
    default_endpoint: Option<String>,
    endpoints: BTreeMap<String, String>,
}

impl EndpointRegistryBuilder {
    #[must_use]
    pub fn new(catalog: ContractCatalog) -> Self {
        Self {
            catalog,
            serializers: SerializerRegistry::new(),
            expressions: None,
            default_endpoint: None,
            endpoints: BTreeMap::new(),
        }
    }

    /// Base endpoint for contracts without their own.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.default_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn contract_endpoint(mut self, contract: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(contract.into(), endpoint.into());
        self
    }

    /// Register an extra serializer, replacing any with the same name.
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn ParameterSerializer>) -> Self {
        self.serializers.register(serializer);
        self
    }

    #[must_use]
    pub fn expression_resolver(mut self, resolver: Arc<dyn ExpressionResolver>) -> Self {
        self.expressions = Some(resolver);
        self
    }

    #[must_use]
    pub fn build(self) -> EndpointRegistry {
        EndpointRegistry {
            catalog: self.catalog,
            serializers: self.serializers,
            expressions: self
                .expressions
                .unwrap_or_else(|| Arc::new(IdentityExpressionResolver)),
            default_endpoint: self.default_endpoint,
            endpoints: self.endpoints,
            keys: DashMap::new(),
            cache: DescriptorCache::new(),
        }
    }
}

impl fmt::Debug for EndpointRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistryBuilder")
            .field("contracts", &self.catalog.len())
            .field("serializers", &self.serializers)
            .field("default_endpoint", &self.default_endpoint)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
