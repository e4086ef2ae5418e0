use std::fmt;

use http::Method;

use crate::binding::{ParameterBinding, ParameterBindingResolver};
use crate::contract::{ContractDef, OperationDef};
use crate::error::ContractError;
use crate::metadata::{HeaderTag, VersionTag};
use crate::scanner::MetadataScanner;
use crate::types::TypeDescriptor;

/// Identity of an operation as seen through a target contract.
///
/// Inherited operations keep their declaring contract, so the same parent
/// operation reached through two children yields two distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationKey {
    target: String,
    declaring: String,
    operation: String,
    signature: Vec<TypeDescriptor>,
}

impl OperationKey {
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        declaring: impl Into<String>,
        operation: impl Into<String>,
        signature: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            target: target.into(),
            declaring: declaring.into(),
            operation: operation.into(),
            signature,
        }
    }

    #[must_use]
    pub fn of(target: &str, declaring: &ContractDef, operation: &OperationDef) -> Self {
        Self::new(
            target,
            declaring.name.as_str(),
            operation.name.as_str(),
            operation.signature(),
        )
    }

    /// Contract the caller invokes through.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Contract that declares the operation.
    #[must_use]
    pub fn declaring(&self) -> &str {
        &self.declaring
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn signature(&self) -> &[TypeDescriptor] {
        &self.signature
    }

    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.target != self.declaring
    }

    /// `op(A, B)`, without the contract names.
    #[must_use]
    pub fn method_signature(&self) -> String {
        let types: Vec<&str> = self.signature.iter().map(TypeDescriptor::as_str).collect();
        format!("{}({})", self.operation, types.join(", "))
    }
}

/// `Target::op(A, B)`, or `Target(Declaring)::op(A, B)` for inherited ones.
impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target)?;
        if self.is_inherited() {
            write!(f, "({})", self.declaring)?;
        }
        write!(f, "::{}", self.method_signature())
    }
}

/// Operation-level metadata with resolved parameter bindings.
#[derive(Debug, Clone)]
pub struct OperationModel {
    key: OperationKey,
    method: Method,
    path: Option<String>,
    headers: Vec<HeaderTag>,
    version: Option<VersionTag>,
    parameters: Vec<ParameterBinding>,
    return_type: TypeDescriptor,
}

impl OperationModel {
    /// Resolve an operation's own metadata and its parameter bindings.
    ///
    /// # Errors
    /// - [`ContractError::MissingHttpMethod`], [`ContractError::AmbiguousHttpMethod`]
    ///   or [`ContractError::InvalidHttpMethod`] when the verb is not exactly one
    ///   valid method
    /// - any parameter binding error
    pub fn resolve(
        key: OperationKey,
        operation: &OperationDef,
        bindings: &ParameterBindingResolver<'_>,
    ) -> Result<Self, ContractError> {
        let method = Self::resolve_method(&key, operation)?;
        let parameters = bindings.resolve_all(&key, &operation.parameters)?;

        Ok(Self {
            method,
            path: MetadataScanner::path(&operation.tags).map(str::to_owned),
            headers: MetadataScanner::headers([operation.tags.as_slice()]),
            version: MetadataScanner::version([operation.tags.as_slice()]).cloned(),
            parameters,
            return_type: operation.returns.clone(),
            key,
        })
    }

    fn resolve_method(key: &OperationKey, operation: &OperationDef) -> Result<Method, ContractError> {
        let verbs = MetadataScanner::verbs(&operation.tags);
        let verb = match verbs.as_slice() {
            [] => {
                return Err(ContractError::MissingHttpMethod {
                    operation: key.clone(),
                });
            }
            [verb] => verb.trim(),
            many => {
                return Err(ContractError::AmbiguousHttpMethod {
                    operation: key.clone(),
                    methods: many.iter().map(|verb| (*verb).to_owned()).collect(),
                });
            }
        };

        Method::from_bytes(verb.to_ascii_uppercase().as_bytes()).map_err(|_| {
            ContractError::InvalidHttpMethod {
                operation: key.clone(),
                method: verb.to_owned(),
            }
        })
    }

    #[must_use]
    pub fn key(&self) -> &OperationKey {
        &self.key
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Operation path template, if declared.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Operation-level static headers, cookies translated to `Cookie` headers.
    #[must_use]
    pub fn headers(&self) -> &[HeaderTag] {
        &self.headers
    }

    #[must_use]
    pub fn version(&self) -> Option<&VersionTag> {
        self.version.as_ref()
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterBinding] {
        &self.parameters
    }

    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    pub(crate) fn into_parts(self) -> (OperationKey, Method, Vec<ParameterBinding>, TypeDescriptor) {
        (self.key, self.method, self.parameters, self.return_type)
    }
}
