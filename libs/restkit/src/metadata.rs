//! Declarative metadata attached to contracts, operations and parameters.
//!
//! Contract types and operations share one tag vocabulary ([`Tag`]);
//! parameters carry [`ParameterTag`]s. Tags deserialize from YAML in
//! externally tagged form:
//!
//! ```yaml
//! tags:
//!   - path: /users
//!   - get
//!   - header: { name: Accept, value: application/json }
//!   - version: { value: v1, uri: true }
//! ```

use serde::{Deserialize, Serialize};

use crate::binding::BindingKind;

/// A static header declared on a contract or operation.
///
/// The value may be a `{param}` placeholder bound to a header parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderTag {
    pub name: String,
    pub value: String,
}

impl HeaderTag {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A static cookie; becomes a `Cookie: name=value` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookieTag {
    pub name: String,
    pub value: String,
}

impl CookieTag {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// API version declaration.
///
/// `uri` marks the version as appearing in the endpoint path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionTag {
    pub value: String,
    #[serde(default)]
    pub uri: bool,
}

impl VersionTag {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            uri: false,
        }
    }

    /// Same version, flagged to appear in the URI.
    #[must_use]
    pub fn in_uri(mut self) -> Self {
        self.uri = true;
        self
    }
}

/// Tag attached to a contract type or to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Path segment (contract base path or operation path)
    Path(String),
    /// Explicit HTTP verb value
    Method(String),
    /// Verb meta-tags
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Header(HeaderTag),
    /// Aggregate header declaration
    Headers(Vec<HeaderTag>),
    Cookie(CookieTag),
    Version(VersionTag),
}

impl Tag {
    /// HTTP verb defined by this tag, if it is verb-defining.
    #[must_use]
    pub fn verb(&self) -> Option<&str> {
        match self {
            Self::Method(method) => Some(method.as_str()),
            Self::Get => Some("GET"),
            Self::Post => Some("POST"),
            Self::Put => Some("PUT"),
            Self::Delete => Some("DELETE"),
            Self::Patch => Some("PATCH"),
            Self::Head => Some("HEAD"),
            Self::Options => Some("OPTIONS"),
            Self::Trace => Some("TRACE"),
            Self::Path(_)
            | Self::Header(_)
            | Self::Headers(_)
            | Self::Cookie(_)
            | Self::Version(_) => None,
        }
    }

    /// Tag name as written in contract files.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Method(_) => "method",
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
            Self::Trace => "trace",
            Self::Header(_) => "header",
            Self::Headers(_) => "headers",
            Self::Cookie(_) => "cookie",
            Self::Version(_) => "version",
        }
    }
}

/// Binding options shared by named parameter tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamedBinding {
    /// Explicit name override; blank falls back to the declared parameter name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Registered serializer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
}

impl NamedBinding {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            serializer: None,
        }
    }

    #[must_use]
    pub fn serializer(mut self, serializer: impl Into<String>) -> Self {
        self.serializer = Some(serializer.into());
        self
    }

    /// Explicit name when present and non-blank.
    #[must_use]
    pub fn explicit_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Options of an aggregate query map parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serializer: Option<String>,
}

/// Tag attached to an operation parameter.
///
/// At most one of these may appear on a parameter; none means PATH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterTag {
    Path(NamedBinding),
    Header(NamedBinding),
    Body,
    Query(NamedBinding),
    /// Aggregate query parameters taken from an object argument
    QueryMap(MapBinding),
    Cookie(NamedBinding),
    Callback,
}

impl ParameterTag {
    #[must_use]
    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Path(_) => BindingKind::Path,
            Self::Header(_) => BindingKind::Header,
            Self::Body => BindingKind::Body,
            Self::Query(_) | Self::QueryMap(_) => BindingKind::Query,
            Self::Cookie(_) => BindingKind::Cookie,
            Self::Callback => BindingKind::Callback,
        }
    }

    /// Tag name as written in contract files.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Header(_) => "header",
            Self::Body => "body",
            Self::Query(_) => "query",
            Self::QueryMap(_) => "query_map",
            Self::Cookie(_) => "cookie",
            Self::Callback => "callback",
        }
    }

    /// Explicit serializer name carried by the tag.
    #[must_use]
    pub fn serializer(&self) -> Option<&str> {
        match self {
            Self::Path(binding)
            | Self::Header(binding)
            | Self::Query(binding)
            | Self::Cookie(binding) => binding.serializer.as_deref(),
            Self::QueryMap(binding) => binding.serializer.as_deref(),
            Self::Body | Self::Callback => None,
        }
    }

    /// Explicit non-blank name override carried by the tag.
    #[must_use]
    pub fn explicit_name(&self) -> Option<&str> {
        match self {
            Self::Path(binding)
            | Self::Header(binding)
            | Self::Query(binding)
            | Self::Cookie(binding) => binding.explicit_name(),
            Self::QueryMap(_) | Self::Body | Self::Callback => None,
        }
    }
}
