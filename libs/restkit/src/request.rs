use http::{HeaderMap, Method};
use serde_json::{Value, json};

use crate::types::TypeDescriptor;

/// A fully expanded request, ready for an HTTP executor.
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Value>,
    pub(crate) version: Option<String>,
    pub(crate) return_type: TypeDescriptor,
}

impl EndpointRequest {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Expanded path, including any query part written into the template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query part from QUERY bindings: `?`-prefixed, or empty when nothing
    /// is bound.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Path with the binding query appended.
    ///
    /// Uses `&` when the path already carries a query part.
    #[must_use]
    pub fn uri(&self) -> String {
        let Some(pairs) = self.query.strip_prefix('?').filter(|pairs| !pairs.is_empty()) else {
            return self.path.clone();
        };
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{separator}{pairs}", self.path)
    }

    /// JSON view for logs and tooling.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let headers: Vec<Value> = self
            .headers
            .iter()
            .map(|(name, value)| {
                json!({
                    "name": name.as_str(),
                    "value": String::from_utf8_lossy(value.as_bytes()),
                })
            })
            .collect();

        json!({
            "method": self.method.as_str(),
            "uri": self.uri(),
            "headers": headers,
            "body": self.body,
            "version": self.version,
            "returns": self.return_type.as_str(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn request(path: &str, query: &str) -> EndpointRequest {
        EndpointRequest {
            method: Method::GET,
            path: path.to_owned(),
            query: query.to_owned(),
            headers: HeaderMap::new(),
            body: None,
            version: None,
            return_type: TypeDescriptor::void(),
        }
    }

    #[test]
    fn test_uri_appends_query() {
        assert_eq!(request("/a", "").uri(), "/a");
        assert_eq!(request("/a", "?x=1").uri(), "/a?x=1");
        assert_eq!(request("/a?y=2", "?x=1").uri(), "/a?y=2&x=1");
        assert_eq!(request("/a?y=2", "?x=1&z=3").uri(), "/a?y=2&x=1&z=3");
    }

    #[test]
    fn test_to_json() {
        let value = request("/a", "?x=1").to_json();
        assert_eq!(value["method"], "GET");
        assert_eq!(value["uri"], "/a?x=1");
        assert_eq!(value["body"], Value::Null);
    }
}
