#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! URI templates and path joining for `RestKit` endpoint contracts.
//!
//! - [`UriTemplate`] parses `{var}` expressions with the `+`, `#`, `/`, `?`
//!   and `&` operators and expands them against any [`VariableResolver`].
//! - [`join_paths`] assembles endpoint paths from base URI, contract and
//!   operation segments with single-slash joining.
//!
//! # Example
//!
//! ```
//! use restkit_uri::{join_paths, UriTemplate};
//!
//! let path = join_paths(["http://my.api.com", "/users", "/{id}{?fields}"]);
//! let template = UriTemplate::parse(&path).unwrap();
//! assert_eq!(
//!     template.expand(&[("id", "42"), ("fields", "name")]),
//!     "http://my.api.com/users/42?fields=name"
//! );
//! ```

mod error;
mod path;
mod template;

pub use error::TemplateError;
pub use path::{has_scheme, join_paths};
pub use template::{
    Expression, FnResolver, Operator, UriTemplate, VariableResolver, expand, from_fn,
};
