use std::collections::HashSet;

use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::binding::{BindingKind, ParameterBinding};
use crate::descriptor::{EndpointDescriptor, EndpointHeader};
use crate::error::ExpansionError;
use crate::scanner::COOKIE_HEADER;

/// Resolves header value templates and assembles the request headers.
#[derive(Debug, Clone)]
pub struct HeaderParameterResolver<'a> {
    headers: &'a [EndpointHeader],
    bindings: Vec<&'a ParameterBinding>,
    cookies: Vec<&'a ParameterBinding>,
}

/// Parameter name of a template that is exactly `{name}`.
fn placeholder(template: &str) -> Option<&str> {
    template
        .trim()
        .strip_prefix('{')?
        .strip_suffix('}')
        .filter(|name| {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        })
}

impl<'a> HeaderParameterResolver<'a> {
    #[must_use]
    pub fn new(descriptor: &'a EndpointDescriptor) -> Self {
        Self {
            headers: descriptor.headers(),
            bindings: descriptor.bindings(BindingKind::Header).collect(),
            cookies: descriptor.bindings(BindingKind::Cookie).collect(),
        }
    }

    fn binding(&self, template: &str) -> Option<&'a ParameterBinding> {
        let name = placeholder(template)?;
        self.bindings
            .iter()
            .copied()
            .find(|binding| binding.name() == Some(name))
    }

    /// Resolve one header value template.
    ///
    /// A template that is exactly `{param}` naming a HEADER binding takes the
    /// argument's value (null gives an empty value); anything else is
    /// returned literally.
    #[must_use]
    pub fn resolve_value(&self, template: &str, args: &[Value]) -> String {
        match self.binding(template) {
            Some(binding) => args
                .get(binding.position())
                .and_then(|value| binding.serialize(value))
                .unwrap_or_default(),
            None => template.to_owned(),
        }
    }

    /// Assemble every request header.
    ///
    /// Declared headers come first, then HEADER bindings no template refers
    /// to, then one merged `Cookie` header.
    ///
    /// # Errors
    /// [`ExpansionError::InvalidHeaderName`] or
    /// [`ExpansionError::InvalidHeaderValue`] when a header fails validation.
    pub fn resolve(&self, args: &[Value]) -> Result<HeaderMap, ExpansionError> {
        let mut headers = HeaderMap::new();
        let mut cookies: Vec<String> = Vec::new();
        let mut referenced: HashSet<usize> = HashSet::new();

        for header in self.headers {
            if let Some(binding) = self.binding(header.value()) {
                referenced.insert(binding.position());
            }
            let value = self.resolve_value(header.value(), args);
            if header.name().eq_ignore_ascii_case(COOKIE_HEADER) {
                if !value.is_empty() {
                    cookies.push(value);
                }
                continue;
            }
            append(&mut headers, header.name(), &value)?;
        }

        for binding in &self.bindings {
            if referenced.contains(&binding.position()) {
                continue;
            }
            let (Some(name), Some(value)) = (
                binding.name(),
                args.get(binding.position())
                    .and_then(|value| binding.serialize(value)),
            ) else {
                continue;
            };
            append(&mut headers, name, &value)?;
        }

        cookies.extend(self.cookies(args));
        if !cookies.is_empty() {
            append(&mut headers, COOKIE_HEADER, &cookies.join("; "))?;
        }

        Ok(headers)
    }

    /// `name=value` for every non-null COOKIE binding.
    #[must_use]
    pub fn cookies(&self, args: &[Value]) -> Vec<String> {
        self.cookies
            .iter()
            .filter_map(|binding| {
                let name = binding.name()?;
                let value = binding.serialize(args.get(binding.position())?)?;
                Some(format!("{name}={value}"))
            })
            .collect()
    }
}

fn append(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), ExpansionError> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|source| ExpansionError::InvalidHeaderName {
            name: name.to_owned(),
            source,
        })?;
    let header_value =
        HeaderValue::from_str(value).map_err(|source| ExpansionError::InvalidHeaderValue {
            name: name.to_owned(),
            source,
        })?;
    headers.append(header_name, header_value);
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert_eq!(placeholder("{token}"), Some("token"));
        assert_eq!(placeholder(" {x-id} "), Some("x-id"));
        assert_eq!(placeholder("Bearer {token}"), None);
        assert_eq!(placeholder("{+token}"), None);
        assert_eq!(placeholder("{}"), None);
        assert_eq!(placeholder("application/json"), None);
    }
}
