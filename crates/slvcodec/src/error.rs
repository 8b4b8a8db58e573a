//! The error taxonomy for the whole crate (spec §7: every kind is fatal to
//! the current top-level call; nothing is recovered internally).

use std::collections::BTreeSet;

/// Any failure a public `slvcodec` function can return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlvError {
    /// Unbalanced parentheses, a misplaced operator, or an empty operand
    /// during the parse pipeline (symbolic §4.A steps 1-4).
    #[error("parse error: {0}")]
    ParseError(String),

    /// A free name remained in an expression when `value()` was called.
    #[error("unresolved expression: free name `{0}` has no binding")]
    UnresolvedExpression(String),

    /// Rational evaluation of a `Mul` produced a non-integer result.
    #[error("non-integral value: {numerator}/{denominator} is not an integer")]
    NonIntegralValue { numerator: i64, denominator: i64 },

    /// An unknown type or constant name was referenced during resolution.
    #[error("resolution error: unknown name `{0}`")]
    ResolutionError(String),

    /// The dependency fix-point stalled: a cycle, or a reference to a name
    /// that will never become available.
    #[error("unresolved dependencies: {}", format_names(.0))]
    UnresolvedDependencies(BTreeSet<String>),

    /// Two merged packages (via `use ... all`) export the same name.
    #[error("name collision: `{0}` is exported by more than one used package")]
    NameCollision(String),

    /// A `use` clause selected something other than `all`.
    #[error("unsupported use: `{0}` must select `all`")]
    UnsupportedUse(String),

    /// The same design unit was named by two `use` clauses.
    #[error("duplicate use: `{0}` referenced more than once")]
    DuplicateUse(String),

    /// Codec generation was requested for a type variant that has no
    /// codec of its own (spec §4.E: only record/array/constrained-vector
    /// variants are supported).
    #[error("unsupported type: `{0}` cannot be codec-generated")]
    UnsupportedType(String),

    /// A value was out of range, an enumeration literal was unknown, or a
    /// bit-string's length didn't match the type's width.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn format_names(names: &BTreeSet<String>) -> String {
    names
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, SlvError>;
