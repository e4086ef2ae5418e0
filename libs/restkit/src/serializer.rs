//! Parameter value serializers.
//!
//! A serializer renders one argument value into the textual form a binding
//! needs. Built-ins are registered under fixed names and may be replaced by
//! registering another serializer with the same name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::BindingKind;

/// Default serializer for path, header and cookie bindings.
pub const SIMPLE: &str = "simple";
/// Default serializer for named query bindings.
pub const QUERY: &str = "query";
/// Default serializer for aggregate query-map bindings.
pub const QUERY_MAP: &str = "query-map";
/// Compact JSON rendering.
pub const JSON: &str = "json";

/// Renders a parameter value for a binding kind.
pub trait ParameterSerializer: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Whether this serializer can render values for `kind`.
    fn supports(&self, kind: BindingKind) -> bool;

    /// Render `value` bound under `name`.
    ///
    /// Query serializers return complete `name=value` pairs joined by `&`;
    /// all others return the bare value.
    fn serialize(&self, name: &str, value: &Value) -> String;
}

/// Plain text rendering of a JSON value.
///
/// Strings are unquoted, null is empty and arrays are comma-joined. Objects
/// fall back to compact JSON.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
    }
}

fn query_pair(name: &str, value: &str) -> String {
    format!(
        "{}={}",
        urlencoding::encode(name),
        urlencoding::encode(value)
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSerializer;

impl ParameterSerializer for SimpleSerializer {
    fn name(&self) -> &str {
        SIMPLE
    }

    fn supports(&self, kind: BindingKind) -> bool {
        matches!(
            kind,
            BindingKind::Path | BindingKind::Header | BindingKind::Cookie
        )
    }

    fn serialize(&self, _name: &str, value: &Value) -> String {
        value_to_string(value)
    }
}

/// `name=value` pairs; arrays repeat the name once per element.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuerySerializer;

impl ParameterSerializer for QuerySerializer {
    fn name(&self) -> &str {
        QUERY
    }

    fn supports(&self, kind: BindingKind) -> bool {
        kind == BindingKind::Query
    }

    fn serialize(&self, name: &str, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Array(items) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| query_pair(name, &value_to_string(item)))
                .collect::<Vec<_>>()
                .join("&"),
            other => query_pair(name, &value_to_string(other)),
        }
    }
}

/// Expands an object argument into one query pair per non-null entry.
///
/// Non-object values degrade to a single named pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryMapSerializer;

impl ParameterSerializer for QueryMapSerializer {
    fn name(&self) -> &str {
        QUERY_MAP
    }

    fn supports(&self, kind: BindingKind) -> bool {
        kind == BindingKind::Query
    }

    fn serialize(&self, name: &str, value: &Value) -> String {
        match value {
            Value::Object(entries) => entries
                .iter()
                .map(|(key, entry)| QuerySerializer.serialize(key, entry))
                .filter(|pair| !pair.is_empty())
                .collect::<Vec<_>>()
                .join("&"),
            other => QuerySerializer.serialize(name, other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ParameterSerializer for JsonSerializer {
    fn name(&self) -> &str {
        JSON
    }

    fn supports(&self, kind: BindingKind) -> bool {
        matches!(
            kind,
            BindingKind::Path | BindingKind::Header | BindingKind::Cookie
        )
    }

    fn serialize(&self, _name: &str, value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Serializers available to binding resolution, keyed by name.
#[derive(Clone)]
pub struct SerializerRegistry {
    serializers: BTreeMap<String, Arc<dyn ParameterSerializer>>,
}

impl SerializerRegistry {
    /// Registry holding the built-in serializers.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            serializers: BTreeMap::new(),
        };
        registry.register(Arc::new(SimpleSerializer));
        registry.register(Arc::new(QuerySerializer));
        registry.register(Arc::new(QueryMapSerializer));
        registry.register(Arc::new(JsonSerializer));
        registry
    }

    /// Register `serializer` under its own name, returning the one it replaced.
    pub fn register(
        &mut self,
        serializer: Arc<dyn ParameterSerializer>,
    ) -> Option<Arc<dyn ParameterSerializer>> {
        self.serializers
            .insert(serializer.name().to_owned(), serializer)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ParameterSerializer>> {
        self.serializers.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.serializers.keys().map(String::as_str)
    }

    /// Default serializer for `kind`; `None` for body and callback bindings.
    #[must_use]
    pub fn default_for(
        &self,
        kind: BindingKind,
        aggregate: bool,
    ) -> Option<Arc<dyn ParameterSerializer>> {
        match kind {
            BindingKind::Path | BindingKind::Header | BindingKind::Cookie => self.get(SIMPLE),
            BindingKind::Query if aggregate => self.get(QUERY_MAP),
            BindingKind::Query => self.get(QUERY),
            BindingKind::Body | BindingKind::Callback => None,
        }
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("serializers", &self.serializers.keys().collect::<Vec<_>>())
            .finish()
    }
}
