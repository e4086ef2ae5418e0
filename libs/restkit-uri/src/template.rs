//! URI template parsing and expansion.
//!
//! Supports the operator subset used by endpoint contracts:
//!
//! | Operator | Example        | Prefix | Separator | Named | Encoded |
//! |----------|----------------|--------|-----------|-------|---------|
//! | (none)   | `{id}`         |        | `,`       | no    | no      |
//! | `+`      | `{+path}`      |        | `,`       | no    | no      |
//! | `#`      | `{#frag}`      | `#`    | `,`       | no    | no      |
//! | `/`      | `{/segment}`   | `/`    | `/`       | no    | no      |
//! | `?`      | `{?page,size}` | `?`    | `&`       | yes   | yes     |
//! | `&`      | `{&page}`      | `&`    | `&`       | yes   | yes     |
//!
//! Any other operator is rejected while parsing. Undefined variables are
//! skipped; an expression whose variables are all undefined expands to an
//! empty string.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;

use crate::error::TemplateError;

/// Source of variable values for template expansion.
///
/// Returning `None` marks the variable as undefined.
pub trait VariableResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<T: VariableResolver + ?Sized> VariableResolver for &T {
    fn resolve(&self, name: &str) -> Option<String> {
        (**self).resolve(name)
    }
}

impl<S: BuildHasher> VariableResolver for HashMap<String, String, S> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl VariableResolver for BTreeMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl VariableResolver for [(&str, &str)] {
    fn resolve(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| (*value).to_owned())
    }
}

impl<const N: usize> VariableResolver for [(&str, &str); N] {
    fn resolve(&self, name: &str) -> Option<String> {
        self.as_slice().resolve(name)
    }
}

/// Adapter turning a closure into a [`VariableResolver`].
#[derive(Clone, Copy)]
pub struct FnResolver<F>(F);

impl<F> VariableResolver for FnResolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }
}

/// Wrap a closure as a variable resolver.
///
/// ```
/// use restkit_uri::{UriTemplate, from_fn};
///
/// let template = UriTemplate::parse("/users/{id}").unwrap();
/// let expanded = template.expand(&from_fn(|name| (name == "id").then(|| "7".to_owned())));
/// assert_eq!(expanded, "/users/7");
/// ```
#[must_use]
pub fn from_fn<F>(f: F) -> FnResolver<F>
where
    F: Fn(&str) -> Option<String>,
{
    FnResolver(f)
}

/// Expression operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `{var}` - value inserted as-is
    Simple,
    /// `{+var}` - reserved expansion, value inserted unescaped
    Reserved,
    /// `{#var}` - fragment, prefixed with `#`
    Fragment,
    /// `{/var}` - path segment, prefixed with `/`
    PathSegment,
    /// `{?var}` - form-style query, prefixed with `?name=`
    Query,
    /// `{&var}` - query continuation, prefixed with `&name=`
    QueryContinuation,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '/' => Some(Self::PathSegment),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    /// Character that introduces the operator inside braces (`None` for simple).
    #[must_use]
    pub fn symbol(self) -> Option<char> {
        match self {
            Self::Simple => None,
            Self::Reserved => Some('+'),
            Self::Fragment => Some('#'),
            Self::PathSegment => Some('/'),
            Self::Query => Some('?'),
            Self::QueryContinuation => Some('&'),
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Fragment => "#",
            Self::PathSegment => "/",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ",",
            Self::PathSegment => "/",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    fn is_named(self) -> bool {
        matches!(self, Self::Query | Self::QueryContinuation)
    }

    fn encodes(self) -> bool {
        matches!(self, Self::Query | Self::QueryContinuation)
    }
}

/// A single `{...}` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    operator: Operator,
    variables: Vec<String>,
}

impl Expression {
    fn parse(body: &str, template: &str, position: usize) -> Result<Self, TemplateError> {
        let Some(first) = body.chars().next() else {
            return Err(TemplateError::EmptyExpression {
                template: template.to_owned(),
                position,
            });
        };

        let (operator, names) = match Operator::from_char(first) {
            Some(operator) => (operator, &body[first.len_utf8()..]),
            None if is_name_char(first) => (Operator::Simple, body),
            None => {
                return Err(TemplateError::UnsupportedOperator {
                    operator: first,
                    expression: body.to_owned(),
                });
            }
        };

        if names.is_empty() {
            return Err(TemplateError::EmptyExpression {
                template: template.to_owned(),
                position,
            });
        }

        let variables = names
            .split(',')
            .map(|name| {
                if !name.is_empty() && name.chars().all(is_name_char) {
                    Ok(name.to_owned())
                } else {
                    Err(TemplateError::InvalidVariable {
                        name: name.to_owned(),
                        expression: body.to_owned(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            operator,
            variables,
        })
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    fn expand_into<R: VariableResolver + ?Sized>(&self, out: &mut String, resolver: &R) {
        let mut first = true;
        for name in &self.variables {
            let Some(value) = resolver.resolve(name) else {
                continue;
            };

            out.push_str(if first {
                self.operator.prefix()
            } else {
                self.operator.separator()
            });
            first = false;

            if self.operator.is_named() {
                out.push_str(name);
                out.push('=');
            }

            if self.operator.encodes() {
                out.push_str(&urlencoding::encode(&value));
            } else {
                out.push_str(&value);
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        if let Some(symbol) = self.operator.symbol() {
            write!(f, "{symbol}")?;
        }
        f.write_str(&self.variables.join(","))?;
        f.write_str("}")
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression(Expression),
}

/// A parsed URI template.
///
/// Parsing is the only fallible step; [`expand`](Self::expand) is a pure
/// function of the template and the resolver.
///
/// ```
/// use restkit_uri::UriTemplate;
///
/// let template = UriTemplate::parse("/users/{id}{?fields}").unwrap();
/// let url = template.expand(&[("id", "42"), ("fields", "name,email")]);
/// assert_eq!(url, "/users/42?fields=name%2Cemail");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a template string.
    ///
    /// # Errors
    /// Returns [`TemplateError`] for unterminated or empty expressions,
    /// invalid variable names and unsupported operators.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        let mut offset = 0;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);

            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                return Err(TemplateError::Unterminated {
                    template: template.to_owned(),
                    position: offset + open,
                });
            };

            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            parts.push(Part::Expression(Expression::parse(
                &after[..close],
                template,
                offset + open,
            )?));

            let consumed = open + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            source: template.to_owned(),
            parts,
        })
    }

    /// Original template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Variable names in order of appearance (repeats included).
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.expressions()
            .flat_map(|expression| expression.variables.iter().map(String::as_str))
    }

    /// Parsed expressions in order of appearance.
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.parts.iter().filter_map(|part| match part {
            Part::Expression(expression) => Some(expression),
            Part::Literal(_) => None,
        })
    }

    /// True when the template contains no expressions.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.expressions().next().is_none()
    }

    /// Expand the template against `resolver`.
    #[must_use]
    pub fn expand<R: VariableResolver + ?Sized>(&self, resolver: &R) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression(expression) => expression.expand_into(&mut out, resolver),
            }
        }
        out
    }
}

impl FromStr for UriTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse and expand `template` in one step.
///
/// # Errors
/// Returns [`TemplateError`] when the template does not parse.
pub fn expand<R: VariableResolver + ?Sized>(
    template: &str,
    resolver: &R,
) -> Result<String, TemplateError> {
    UriTemplate::parse(template).map(|parsed| parsed.expand(resolver))
}
