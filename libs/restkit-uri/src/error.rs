use thiserror::Error;

/// Errors raised while parsing a URI template.
///
/// Expansion itself never fails: once a template parses, undefined variables
/// simply expand to nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    /// Expression starts with an operator the engine does not implement
    #[error("unsupported template operator '{operator}' in expression '{{{expression}}}'")]
    UnsupportedOperator {
        /// The offending operator character
        operator: char,
        /// Expression body without the surrounding braces
        expression: String,
    },

    /// An opening brace has no matching closing brace
    #[error("unterminated expression at byte {position} in template '{template}'")]
    Unterminated { template: String, position: usize },

    /// `{}` or an operator with no variable names
    #[error("empty expression at byte {position} in template '{template}'")]
    EmptyExpression { template: String, position: usize },

    /// Variable name contains characters outside `[A-Za-z0-9_.-]`
    #[error("invalid variable name '{name}' in expression '{{{expression}}}'")]
    InvalidVariable { name: String, expression: String },
}
