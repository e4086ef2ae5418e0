use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a value type as declared by a contract (`String`, `User`,
/// `List<Order>`, `void`, ...).
///
/// The core never interprets the name beyond [`is_void`](Self::is_void); it is
/// carried through to descriptors for codecs and executors downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor(String);

impl TypeDescriptor {
    /// Canonical name of the empty return type.
    pub const VOID: &'static str = "void";

    /// Name used for parameters declared without a type.
    pub const ANY: &'static str = "any";

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn void() -> Self {
        Self(Self::VOID.to_owned())
    }

    #[must_use]
    pub fn any() -> Self {
        Self(Self::ANY.to_owned())
    }

    /// True for `void`, `()`, `unit` and the blank name.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self.0.trim(), "" | "void" | "()" | "unit")
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        Self::void()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeDescriptor {
    fn from(value: String) -> Self {
        Self(value)
    }
}
