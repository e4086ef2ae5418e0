//! Build-time resolution of `@{key}` property placeholders in endpoint and
//! contract paths.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

/// Rewrites raw path text before it is joined into a template.
pub trait ExpressionResolver: Send + Sync {
    fn resolve(&self, expression: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExpressionResolver;

impl ExpressionResolver for IdentityExpressionResolver {
    fn resolve(&self, expression: &str) -> String {
        expression.to_owned()
    }
}

/// Key/value lookup backing [`PropertyExpressionResolver`].
pub trait PropertySource: Send + Sync {
    fn property(&self, key: &str) -> Option<String>;
}

impl<S: BuildHasher + Send + Sync> PropertySource for HashMap<String, String, S> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl PropertySource for BTreeMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Process environment; `api.host` is also looked up as `API_HOST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvPropertySource;

impl PropertySource for EnvPropertySource {
    fn property(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().or_else(|| {
            let upper: String = key
                .chars()
                .map(|c| match c {
                    '.' | '-' => '_',
                    other => other.to_ascii_uppercase(),
                })
                .collect();
            std::env::var(upper).ok()
        })
    }
}

/// Tries `first`, then `second`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: PropertySource, B: PropertySource> PropertySource for Chain<A, B> {
    fn property(&self, key: &str) -> Option<String> {
        self.first
            .property(key)
            .or_else(|| self.second.property(key))
    }
}

#[allow(clippy::expect_used)] // literal pattern
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\{([^{}]+)\}").expect("static regex should not panic"));

/// Substitutes `@{key}` with values from a [`PropertySource`].
///
/// Unknown keys are left in place and logged.
#[derive(Debug, Clone, Default)]
pub struct PropertyExpressionResolver<P> {
    source: P,
}

impl<P: PropertySource> PropertyExpressionResolver<P> {
    #[must_use]
    pub fn new(source: P) -> Self {
        Self { source }
    }
}

impl<P: PropertySource> ExpressionResolver for PropertyExpressionResolver<P> {
    fn resolve(&self, expression: &str) -> String {
        PLACEHOLDER
            .replace_all(expression, |caps: &Captures<'_>| {
                let key = caps[1].trim();
                self.source.property(key).unwrap_or_else(|| {
                    warn!(key, expression, "unresolved property placeholder");
                    caps[0].to_owned()
                })
            })
            .into_owned()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    fn properties() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("api.host".to_owned(), "http://my.api.com".to_owned()),
            ("api.version".to_owned(), "v2".to_owned()),
        ])
    }

    #[test]
    fn test_identity_resolver() {
        assert_eq!(IdentityExpressionResolver.resolve("@{x}/y"), "@{x}/y");
    }

    #[test]
    fn test_placeholders_substituted() {
        let resolver = PropertyExpressionResolver::new(properties());
        assert_eq!(
            resolver.resolve("@{api.host}/@{ api.version }/users"),
            "http://my.api.com/v2/users"
        );
    }

    #[test]
    #[traced_test]
    fn test_unknown_placeholder_left_in_place() {
        let resolver = PropertyExpressionResolver::new(properties());
        assert_eq!(resolver.resolve("@{missing}/{id}"), "@{missing}/{id}");
        assert!(logs_contain("unresolved property placeholder"));
    }

    #[test]
    fn test_template_expressions_untouched() {
        let resolver = PropertyExpressionResolver::new(properties());
        assert_eq!(resolver.resolve("/users/{id}{?q}"), "/users/{id}{?q}");
    }

    #[test]
    fn test_chain_and_env_source() {
        temp_env::with_var("RESTKIT_TEST_HOST", Some("http://env.host"), || {
            let resolver =
                PropertyExpressionResolver::new(Chain::new(properties(), EnvPropertySource));
            assert_eq!(
                resolver.resolve("@{restkit.test.host}|@{api.version}"),
                "http://env.host|v2"
            );
        });
    }
}
