use serde_json::Value;

use crate::binding::{BindingKind, ParameterBinding};
use crate::descriptor::EndpointDescriptor;

/// Renders QUERY bindings into a query string.
#[derive(Debug, Clone)]
pub struct QueryParameterResolver<'a> {
    bindings: Vec<&'a ParameterBinding>,
}

impl<'a> QueryParameterResolver<'a> {
    #[must_use]
    pub fn new(descriptor: &'a EndpointDescriptor) -> Self {
        Self {
            bindings: descriptor.bindings(BindingKind::Query).collect(),
        }
    }

    /// `name=value` fragments in binding order; null arguments are skipped.
    #[must_use]
    pub fn pairs(&self, args: &[Value]) -> Vec<String> {
        self.bindings
            .iter()
            .filter_map(|binding| binding.serialize(args.get(binding.position())?))
            .filter(|pair| !pair.is_empty())
            .collect()
    }

    /// `?a=1&b=2`, or empty when nothing is bound.
    #[must_use]
    pub fn resolve(&self, args: &[Value]) -> String {
        let pairs = self.pairs(args);
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}
