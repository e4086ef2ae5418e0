//! Call-time expansion of descriptors into requests.

mod header;
mod path;
mod query;

pub use header::HeaderParameterResolver;
pub use path::PathParameterResolver;
pub use query::QueryParameterResolver;

use serde_json::Value;

use crate::binding::BindingKind;
use crate::descriptor::EndpointDescriptor;
use crate::error::ExpansionError;
use crate::request::EndpointRequest;

/// Expand `descriptor` against one argument per parameter.
///
/// # Errors
/// [`ExpansionError::ArgumentCount`] when `args` does not match the
/// signature, plus any path or header resolution error.
pub fn expand(
    descriptor: &EndpointDescriptor,
    args: &[Value],
) -> Result<EndpointRequest, ExpansionError> {
    let expected = descriptor.parameters().len();
    if args.len() != expected {
        return Err(ExpansionError::ArgumentCount {
            operation: descriptor.key().clone(),
            expected,
            actual: args.len(),
        });
    }

    let path = PathParameterResolver::new(descriptor).resolve(args)?;
    let query = QueryParameterResolver::new(descriptor).resolve(args);
    let headers = HeaderParameterResolver::new(descriptor).resolve(args)?;
    let body = descriptor
        .bindings(BindingKind::Body)
        .next()
        .and_then(|binding| args.get(binding.position()))
        .filter(|value| !value.is_null())
        .cloned();

    Ok(EndpointRequest {
        method: descriptor.method().clone(),
        path,
        query,
        headers,
        body,
        version: descriptor.version().map(str::to_owned),
        return_type: descriptor.return_type().clone(),
    })
}
