use restkit_uri::{UriTemplate, from_fn};
use serde_json::Value;

use crate::binding::{BindingKind, ParameterBinding};
use crate::descriptor::EndpointDescriptor;
use crate::error::ExpansionError;
use crate::operation::OperationKey;

/// Expands a path template from PATH bindings.
#[derive(Debug, Clone)]
pub struct PathParameterResolver<'a> {
    operation: &'a OperationKey,
    template: &'a str,
    bindings: Vec<&'a ParameterBinding>,
}

impl<'a> PathParameterResolver<'a> {
    #[must_use]
    pub fn new(descriptor: &'a EndpointDescriptor) -> Self {
        Self {
            operation: descriptor.key(),
            template: descriptor.path(),
            bindings: descriptor.bindings(BindingKind::Path).collect(),
        }
    }

    fn binding(&self, name: &str) -> Option<&'a ParameterBinding> {
        self.bindings
            .iter()
            .copied()
            .find(|binding| binding.name() == Some(name))
    }

    /// Expand the template against `args`.
    ///
    /// Variables without a PATH binding expand to nothing.
    ///
    /// # Errors
    /// - [`ExpansionError::Template`] for malformed templates
    /// - [`ExpansionError::MissingPathArgument`] when a referenced binding's
    ///   argument is null or absent
    pub fn resolve(&self, args: &[Value]) -> Result<String, ExpansionError> {
        let template = UriTemplate::parse(self.template)?;

        for name in template.variables() {
            let Some(binding) = self.binding(name) else {
                continue;
            };
            if args
                .get(binding.position())
                .is_none_or(Value::is_null)
            {
                return Err(ExpansionError::MissingPathArgument {
                    operation: self.operation.clone(),
                    name: name.to_owned(),
                    position: binding.position(),
                });
            }
        }

        Ok(template.expand(&from_fn(|name| {
            let binding = self.binding(name)?;
            binding.serialize(args.get(binding.position())?)
        })))
    }
}
