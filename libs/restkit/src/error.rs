use restkit_uri::TemplateError;
use thiserror::Error;

use crate::binding::BindingKind;
use crate::config::ConfigError;
use crate::operation::OperationKey;
use crate::types::TypeDescriptor;

/// Build-time contract validation errors.
///
/// Raised once, when a descriptor is first built, and never retried. All of
/// them indicate a broken contract definition rather than a bad call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContractError {
    #[error("contract '{contract}' declares {} parents ({}); at most one is allowed", .parents.len(), .parents.join(", "))]
    MultipleParents {
        contract: String,
        parents: Vec<String>,
    },

    #[error("contract '{0}' is not registered")]
    UnknownContract(String),

    #[error("contract '{contract}' extends unknown contract '{parent}'")]
    UnknownParent { contract: String, parent: String },

    #[error("contract inheritance cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    #[error("contract '{0}' is already registered")]
    DuplicateContract(String),

    /// Tag that is only meaningful on operations was placed on a contract type
    #[error("tag '{tag}' is not allowed on contract '{contract}'")]
    MisplacedTag { contract: String, tag: &'static str },

    #[error("contract '{contract}' has no operation '{operation}'")]
    UnknownOperation { contract: String, operation: String },

    #[error("operation '{operation}' is overloaded in contract '{contract}'; select it by operation key")]
    AmbiguousOperation { contract: String, operation: String },

    #[error("operation {operation} declares no HTTP method")]
    MissingHttpMethod { operation: OperationKey },

    #[error("operation {operation} declares more than one HTTP method ({})", .methods.join(", "))]
    AmbiguousHttpMethod {
        operation: OperationKey,
        methods: Vec<String>,
    },

    #[error("operation {operation} declares invalid HTTP method '{method}'")]
    InvalidHttpMethod {
        operation: OperationKey,
        method: String,
    },

    #[error("operation {operation} declares invalid header name '{name}'")]
    InvalidHeaderName { operation: OperationKey, name: String },

    #[error("parameter #{position} of {operation} carries more than one binding tag ({})", .tags.join(", "))]
    ConflictingParameterTags {
        operation: OperationKey,
        position: usize,
        tags: Vec<&'static str>,
    },

    #[error("parameter #{position} of {operation} is bound as {kind} but has no name")]
    UnresolvedParameterName {
        operation: OperationKey,
        position: usize,
        kind: BindingKind,
    },

    #[error("operation {operation} declares more than one body parameter (#{first} and #{second})")]
    MultipleBodyParameters {
        operation: OperationKey,
        first: usize,
        second: usize,
    },

    #[error("operation {operation} declares more than one callback of type {value_type}")]
    DuplicateCallback {
        operation: OperationKey,
        value_type: TypeDescriptor,
    },

    #[error("parameter #{position} of {operation} references unknown serializer '{serializer}'")]
    UnknownSerializer {
        operation: OperationKey,
        position: usize,
        serializer: String,
    },
}

/// Per-call errors raised while expanding a descriptor into a request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExpansionError {
    #[error("operation {operation} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        operation: OperationKey,
        expected: usize,
        actual: usize,
    },

    /// A path variable is bound to a parameter whose argument is null
    #[error("path variable '{name}' of {operation} is bound to a null argument (#{position})")]
    MissingPathArgument {
        operation: OperationKey,
        name: String,
        position: usize,
    },

    /// Malformed template or unsupported template operator
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid header name '{name}': {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("invalid value for header '{name}': {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
}

/// Umbrella error for APIs that span configuration, building and expansion.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
