//! Symbolic-arithmetic resolver and `std_logic_vector` codec generator for
//! HDL packages.
//!
//! Ingests textual descriptions of an HDL type system (packages of
//! constants and types, entity interfaces) via the parse-tree surface in
//! [`parsetree`], resolves them into a dependency-ordered model
//! ([`package`], [`resolve`]), and either runs host-side bit-string codecs
//! directly against a resolved [`types::Type`] or emits VHDL codec source
//! through [`codegen`].
//!
//! The lexical/grammar pass that turns HDL source text into the
//! [`parsetree`] shapes is an external parser's job; this crate starts from
//! an already-parsed tree. Likewise the CLI front-end, template-expansion
//! to final HDL text, file I/O, and the simulator driver are out of scope —
//! this crate is a library.

pub mod bits;
pub mod codegen;
pub mod error;
pub mod package;
pub mod parsetree;
pub mod resolve;
pub mod symbolic;
pub mod types;

pub use bits::{Bit, SlvString};
pub use codegen::{CodecGeneratorConfig, generate_package};
pub use error::{Result, SlvError};
pub use package::{
    Direction, Entity, Generic, Package, Port, UnresolvedEntity, UnresolvedPackage, builtin_packages, numeric_std,
    std_logic_1164,
};
pub use parsetree::{
    ParsedConstant, ParsedEntity, ParsedGeneric, ParsedPackage, ParsedPort, ParsedSubtypeIndication, ParsedType,
    ParsedTypeShape, PortDirection, Reference,
};
pub use resolve::resolve_dependencies;
pub use symbolic::Expr;
pub use types::{Generics, Signedness, Type, UnresolvedSubtype, UnresolvedType, Value};
