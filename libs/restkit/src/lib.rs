#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Contract resolution and request templating for declarative HTTP clients.
//!
//! A [`ContractCatalog`] holds contract definitions: named groups of
//! operations annotated with paths, verbs, headers, versions and parameter
//! bindings. An [`EndpointRegistry`] turns each operation into an immutable
//! [`EndpointDescriptor`] on first use and caches it; a descriptor then
//! expands an argument list into an [`EndpointRequest`].
//!
//! # Example
//!
//! ```
//! use restkit::{ContractCatalog, ContractDef, EndpointRegistry, OperationDef, ParameterDef};
//! use serde_json::json;
//!
//! let catalog = ContractCatalog::new()
//!     .with(
//!         ContractDef::new("UserApi")
//!             .operation(OperationDef::get("find", "/{id}").param(ParameterDef::new("id", "String"))),
//!     )
//!     .unwrap();
//! let registry = EndpointRegistry::builder(catalog)
//!     .endpoint("http://my.api.com")
//!     .build();
//!
//! let request = registry.request("UserApi", "find", &[json!(42)]).unwrap();
//! assert_eq!(request.method(), &http::Method::GET);
//! assert_eq!(request.uri(), "http://my.api.com/42");
//! ```

mod binding;
mod cache;
mod config;
mod contract;
mod descriptor;
mod error;
pub mod expand;
mod expression;
mod metadata;
mod operation;
mod registry;
mod request;
mod scanner;
pub mod serializer;
mod type_model;
mod types;

pub use binding::{BindingKind, ParameterBinding, ParameterBindingResolver};
pub use cache::DescriptorCache;
pub use config::{ConfigError, ENV_PREFIX, RestkitConfig};
pub use contract::{ContractCatalog, ContractDef, OperationDef, ParameterDef};
pub use descriptor::{EndpointDescriptor, EndpointDescriptorBuilder, EndpointHeader, EndpointTarget};
pub use error::{ContractError, Error, ExpansionError};
pub use expression::{
    Chain, EnvPropertySource, ExpressionResolver, IdentityExpressionResolver,
    PropertyExpressionResolver, PropertySource,
};
pub use metadata::{CookieTag, HeaderTag, MapBinding, NamedBinding, ParameterTag, Tag, VersionTag};
pub use operation::{OperationKey, OperationModel};
pub use registry::{EndpointRegistry, EndpointRegistryBuilder};
pub use request::EndpointRequest;
pub use scanner::{COOKIE_HEADER, MetadataScanner};
pub use serializer::{ParameterSerializer, SerializerRegistry};
pub use type_model::ContractTypeModel;
pub use types::TypeDescriptor;

pub use restkit_uri::{TemplateError, UriTemplate, join_paths};
