//! The parse-tree surface this crate consumes (spec §6). Constructing these
//! values from actual HDL source text is the external parser adapter's job;
//! this crate only consumes them.

use crate::types::Signedness;

/// A `library.design_unit.name_within` use clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub library: String,
    pub design_unit: String,
    pub name_within: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConstant {
    pub identifier: String,
    /// The HDL source text of the constant's right-hand side, to be lexed
    /// and parsed by the symbolic engine.
    pub text: String,
}

/// Either a reference to an already-declared type, or a type declared
/// inline at the point of use (a record field, an array element).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSubtypeIndication {
    Named(String),
    Inline(Box<ParsedTypeShape>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTypeShape {
    Record(Vec<(String, ParsedSubtypeIndication)>),
    UnconstrainedArray(ParsedSubtypeIndication),
    ConstrainedArray {
        base: ParsedSubtypeIndication,
        /// HDL source text of the size expression, e.g. `"N-1"` from a
        /// `(N-1 downto 0)` index constraint.
        size_text: String,
    },
    ConstrainedVector {
        signedness: Signedness,
        size_text: String,
    },
    Enumeration(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub identifier: String,
    pub shape: ParsedTypeShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPackage {
    pub identifier: String,
    pub constants: Vec<ParsedConstant>,
    pub types: Vec<ParsedType>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    In,
    Out,
    Inout,
    Buffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGeneric {
    pub identifier: String,
    pub subtype_indication: ParsedSubtypeIndication,
    pub default_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPort {
    pub identifier: String,
    pub mode: PortDirection,
    pub subtype_indication: ParsedSubtypeIndication,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntity {
    pub identifier: String,
    pub generics: Vec<ParsedGeneric>,
    pub ports: Vec<ParsedPort>,
    pub references: Vec<Reference>,
}
