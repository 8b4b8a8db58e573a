//! The algebra of HDL types (component B), in both unresolved and resolved
//! form, with codec methods attached to the resolved form (spec §4.B).

use indexmap::IndexMap;

use crate::bits::{Bit, SlvString};
use crate::error::{Result, SlvError};
use crate::symbolic::{self, Expr};

/// Values flowing through a codec. One variant per resolved [`Type`] shape;
/// which variant a given codec call expects is determined entirely by the
/// type it's called on.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `std_logic`. `None` is the undefined sentinel (`'X'`/`'U'`/...).
    Bit(Option<bool>),
    /// A `ConstrainedStdLogicVector` interpreted as an integer (plain,
    /// unsigned, or signed). `None` propagates an undefined bit-string.
    Int(Option<i64>),
    Array(Vec<Value>),
    Record(IndexMap<String, Value>),
    /// An enumeration literal, matched case-insensitively.
    Enum(String),
}

/// Concrete generic bindings supplied at encode/decode time.
pub type Generics = IndexMap<String, i64>;

/// Whether a `ConstrainedStdLogicVector` is plain, `unsigned`, or `signed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signedness {
    Plain,
    Unsigned,
    Signed,
}

/// A reference to a subtype: either a named lookup into a package's type
/// map, or an inline type declared on the spot (e.g. a record field written
/// as `std_logic_vector(3 downto 0)` with no separate type declaration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedSubtype {
    Named(String),
    Inline(Box<UnresolvedType>),
}

impl UnresolvedSubtype {
    fn type_dependencies(&self, out: &mut std::collections::BTreeSet<String>) {
        match self {
            UnresolvedSubtype::Named(name) => {
                out.insert(name.clone());
            }
            UnresolvedSubtype::Inline(t) => t.type_dependencies(out),
        }
    }

    pub fn resolve(
        &self,
        types: &IndexMap<String, Type>,
        constants: &IndexMap<String, Expr>,
    ) -> Result<Type> {
        match self {
            UnresolvedSubtype::Named(name) => types
                .get(name)
                .cloned()
                .ok_or_else(|| SlvError::ResolutionError(name.clone())),
            UnresolvedSubtype::Inline(t) => t.resolve(None, types, constants),
        }
    }
}

/// A type whose subtype/constant references are still bare identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedType {
    StdLogic,
    ConstrainedStdLogicVector {
        size: Expr,
        signedness: Signedness,
    },
    UnconstrainedArray {
        subtype: UnresolvedSubtype,
    },
    ConstrainedArray {
        base: UnresolvedSubtype,
        size: Expr,
    },
    Record {
        fields: Vec<(String, UnresolvedSubtype)>,
    },
    Enumeration {
        literals: Vec<String>,
    },
}

impl UnresolvedType {
    /// Names of other types this one must be resolved after. Constant
    /// dependencies inside size expressions do not participate — constants
    /// are always resolved before types (spec §4.C).
    pub fn type_dependencies(&self, out: &mut std::collections::BTreeSet<String>) {
        match self {
            UnresolvedType::StdLogic
            | UnresolvedType::ConstrainedStdLogicVector { .. }
            | UnresolvedType::Enumeration { .. } => {}
            UnresolvedType::UnconstrainedArray { subtype } => subtype.type_dependencies(out),
            UnresolvedType::ConstrainedArray { base, .. } => base.type_dependencies(out),
            UnresolvedType::Record { fields } => {
                for (_, subtype) in fields {
                    subtype.type_dependencies(out);
                }
            }
        }
    }

    /// Resolves this type against already-resolved sibling types and
    /// constants. `id` names the result when this is a top-level package
    /// type; inline subtypes pass `None`.
    pub fn resolve(
        &self,
        id: Option<&str>,
        types: &IndexMap<String, Type>,
        constants: &IndexMap<String, Expr>,
    ) -> Result<Type> {
        match self {
            UnresolvedType::StdLogic => Ok(Type::StdLogic),
            UnresolvedType::ConstrainedStdLogicVector { size, signedness } => {
                let size = symbolic::simplify(symbolic::substitute(size, constants))?;
                Ok(Type::ConstrainedStdLogicVector {
                    identifier: id.map(str::to_string),
                    size,
                    signedness: *signedness,
                })
            }
            UnresolvedType::UnconstrainedArray { subtype } => {
                let resolved_subtype = subtype.resolve(types, constants)?;
                let identifier = id
                    .map(str::to_string)
                    .ok_or_else(|| SlvError::ResolutionError("<anonymous unconstrained array>".into()))?;
                Ok(Type::UnconstrainedArray {
                    identifier,
                    subtype: Box::new(resolved_subtype),
                })
            }
            UnresolvedType::ConstrainedArray { base, size } => {
                let unconstrained = base.resolve(types, constants)?;
                if !matches!(unconstrained, Type::UnconstrainedArray { .. }) {
                    return Err(SlvError::ResolutionError(format!(
                        "constrained array base `{unconstrained:?}` is not an unconstrained array"
                    )));
                }
                let size = symbolic::simplify(symbolic::substitute(size, constants))?;
                Ok(Type::ConstrainedArray {
                    identifier: id.map(str::to_string),
                    unconstrained: Box::new(unconstrained),
                    size,
                })
            }
            UnresolvedType::Record { fields } => {
                let identifier = id
                    .map(str::to_string)
                    .ok_or_else(|| SlvError::ResolutionError("<anonymous record>".into()))?;
                let resolved_fields = fields
                    .iter()
                    .map(|(name, subtype)| Ok((name.clone(), subtype.resolve(types, constants)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Type::Record {
                    identifier,
                    fields: resolved_fields,
                })
            }
            UnresolvedType::Enumeration { literals } => {
                let identifier = id
                    .map(str::to_string)
                    .ok_or_else(|| SlvError::ResolutionError("<anonymous enumeration>".into()))?;
                Ok(Type::Enumeration {
                    identifier,
                    literals: literals.iter().map(|l| l.to_lowercase()).collect(),
                })
            }
        }
    }
}

/// A type with every subtype/constant reference resolved to a direct value.
/// Once built by the resolver, a resolved [`Type`] is never mutated (spec
/// §3 "Lifecycles").
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    StdLogic,
    ConstrainedStdLogicVector {
        identifier: Option<String>,
        size: Expr,
        signedness: Signedness,
    },
    UnconstrainedArray {
        identifier: String,
        subtype: Box<Type>,
    },
    ConstrainedArray {
        identifier: Option<String>,
        unconstrained: Box<Type>,
        size: Expr,
    },
    Record {
        identifier: String,
        fields: Vec<(String, Type)>,
    },
    Enumeration {
        identifier: String,
        literals: Vec<String>,
    },
}

/// Width of an enumeration with `count` literals: `ceil(log2(count))`,
/// special-cased to 1 for a single literal (spec §3, open question (b)).
fn enumeration_width(count: usize) -> i64 {
    if count <= 1 {
        return 1;
    }
    let mut width = 0u32;
    while (1usize << width) < count {
        width += 1;
    }
    i64::from(width)
}

fn eval(e: &Expr, generics: &Generics) -> Result<i64> {
    let env: IndexMap<String, Expr> = generics
        .iter()
        .map(|(name, value)| (name.clone(), Expr::Int(*value)))
        .collect();
    let substituted = symbolic::substitute(e, &env);
    let simplified = symbolic::simplify(substituted)?;
    symbolic::value(&simplified)
}

impl Type {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Type::StdLogic => None,
            Type::ConstrainedStdLogicVector { identifier, .. }
            | Type::ConstrainedArray { identifier, .. } => identifier.as_deref(),
            Type::UnconstrainedArray { identifier, .. }
            | Type::Record { identifier, .. }
            | Type::Enumeration { identifier, .. } => Some(identifier),
        }
    }

    /// The symbolic width expression, as specified in spec §3. Fails for
    /// `UnconstrainedArray`, whose length is indefinite until a caller
    /// constrains it.
    pub fn width(&self) -> Result<Expr> {
        match self {
            Type::StdLogic => Ok(Expr::Int(1)),
            Type::ConstrainedStdLogicVector { size, .. } => Ok(size.clone()),
            Type::UnconstrainedArray { identifier, .. } => Err(SlvError::InvalidValue(format!(
                "unconstrained array `{identifier}` has no fixed width"
            ))),
            Type::ConstrainedArray { unconstrained, size, .. } => {
                let element_width = unconstrained_subtype_width(unconstrained)?;
                symbolic::simplify(Expr::Mul {
                    num: vec![size.clone(), element_width],
                    den: vec![],
                })
            }
            Type::Record { fields, .. } => {
                let terms = fields
                    .iter()
                    .map(|(_, subtype)| Ok((1i64, subtype.width()?)))
                    .collect::<Result<Vec<_>>>()?;
                symbolic::simplify(Expr::Add(terms))
            }
            Type::Enumeration { literals, .. } => Ok(Expr::Int(enumeration_width(literals.len()))),
        }
    }

    /// Renders the VHDL `type ... is ...;` declaration for this type, where
    /// one exists independent of its codec (spec §10 supplemented feature,
    /// grounded in the original's `Record.declaration`/`Enumeration.declaration`).
    /// Variants whose declaration is inherited from an unconstrained parent
    /// (or that have no declaration syntax of their own) return `None`.
    pub fn declaration(&self) -> Option<String> {
        match self {
            Type::Record { identifier, fields } => {
                let mut lines = vec![format!("type {identifier} is"), "record".to_string()];
                for (name, subtype) in fields {
                    lines.push(format!("    {name}: {};", subtype_reference(subtype)));
                }
                lines.push("end record;".to_string());
                Some(lines.join("\n"))
            }
            Type::Enumeration { identifier, literals } => {
                Some(format!("type {identifier} is ({});", literals.join(", ")))
            }
            _ => None,
        }
    }

    pub fn to_slv(&self, value: &Value, generics: &Generics) -> Result<SlvString> {
        match self {
            Type::StdLogic => match value {
                Value::Bit(Some(b)) => Ok(SlvString::from_bits(vec![Bit::from_bool(*b)])),
                Value::Bit(None) => Err(SlvError::InvalidValue(
                    "cannot encode an undefined std_logic value".into(),
                )),
                other => Err(type_mismatch("std_logic", other)),
            },
            Type::ConstrainedStdLogicVector { size, signedness, .. } => {
                let Value::Int(data) = value else {
                    return Err(type_mismatch("std_logic_vector", value));
                };
                let width = eval(size, generics)? as usize;
                encode_slv_int(*data, width, *signedness)
            }
            Type::UnconstrainedArray { subtype, .. } => {
                let Value::Array(items) = value else {
                    return Err(type_mismatch("array", value));
                };
                encode_array(items, subtype, generics)
            }
            Type::ConstrainedArray { unconstrained, size, .. } => {
                let Value::Array(items) = value else {
                    return Err(type_mismatch("array", value));
                };
                let expected = eval(size, generics)? as usize;
                if items.len() != expected {
                    return Err(SlvError::InvalidValue(format!(
                        "array has {} elements, expected {expected}",
                        items.len()
                    )));
                }
                unconstrained.to_slv(value, generics)
            }
            Type::Record { fields, .. } => {
                let Value::Record(data) = value else {
                    return Err(type_mismatch("record", value));
                };
                let mut result = SlvString::new();
                for (name, subtype) in fields.iter().rev() {
                    let field_value = data
                        .get(name)
                        .ok_or_else(|| SlvError::InvalidValue(format!("record is missing field `{name}`")))?;
                    result = result.concat(subtype.to_slv(field_value, generics)?);
                }
                Ok(result)
            }
            Type::Enumeration { literals, .. } => {
                let Value::Enum(literal) = value else {
                    return Err(type_mismatch("enumeration", value));
                };
                let folded = literal.to_lowercase();
                let index = literals.iter().position(|l| *l == folded).ok_or_else(|| {
                    SlvError::InvalidValue(format!(
                        "enumeration does not contain `{folded}`. options are {literals:?}"
                    ))
                })?;
                let width = enumeration_width(literals.len()) as usize;
                SlvString::from_uint(index as u128, width)
            }
        }
    }

    pub fn from_slv(&self, slv: &SlvString, generics: &Generics) -> Result<Value> {
        match self {
            Type::StdLogic => {
                if slv.len() != 1 {
                    return Err(SlvError::InvalidValue(format!(
                        "std_logic expects 1 bit, got {}",
                        slv.len()
                    )));
                }
                Ok(Value::Bit(slv.bits()[0].to_bool()))
            }
            Type::ConstrainedStdLogicVector { size, signedness, .. } => {
                let width = eval(size, generics)? as usize;
                if slv.len() != width {
                    return Err(SlvError::InvalidValue(format!(
                        "expected {width} bits, got {}",
                        slv.len()
                    )));
                }
                decode_slv_int(slv, *signedness)
            }
            Type::UnconstrainedArray { subtype, .. } => decode_array(slv, subtype, generics),
            Type::ConstrainedArray { unconstrained, size, .. } => {
                let value = unconstrained.from_slv(slv, generics)?;
                let Value::Array(items) = &value else {
                    unreachable!("unconstrained array always decodes to Value::Array")
                };
                let expected = eval(size, generics)? as usize;
                if items.len() != expected {
                    return Err(SlvError::InvalidValue(format!(
                        "array has {} elements, expected {expected}",
                        items.len()
                    )));
                }
                Ok(value)
            }
            Type::Record { .. } => {
                let (value, remainder) = self.reduce_slv(slv, generics)?;
                if !remainder.is_empty() {
                    return Err(SlvError::InvalidValue(format!(
                        "{} unconsumed bits after decoding record",
                        remainder.len()
                    )));
                }
                Ok(value)
            }
            Type::Enumeration { .. } => {
                let (value, remainder) = self.reduce_slv(slv, generics)?;
                if !remainder.is_empty() {
                    return Err(SlvError::InvalidValue(format!(
                        "{} unconsumed bits after decoding enumeration",
                        remainder.len()
                    )));
                }
                Ok(value)
            }
        }
    }

    /// Consumes the right-hand `width` bits of `slv` and returns the parsed
    /// value plus whatever remains, used to decode records field-by-field
    /// (spec §4.B).
    pub fn reduce_slv(&self, slv: &SlvString, generics: &Generics) -> Result<(Value, SlvString)> {
        match self {
            Type::StdLogic => {
                let (right, rest) = slv.split_right(1)?;
                Ok((Value::Bit(right.bits()[0].to_bool()), rest))
            }
            Type::ConstrainedStdLogicVector { size, signedness, .. } => {
                let width = eval(size, generics)? as usize;
                let (right, rest) = slv.split_right(width)?;
                Ok((decode_slv_int(&right, *signedness)?, rest))
            }
            Type::ConstrainedArray { .. } => {
                let width = eval(&self.width()?, generics)? as usize;
                let (right, rest) = slv.split_right(width)?;
                Ok((self.from_slv(&right, generics)?, rest))
            }
            Type::Record { fields, .. } => {
                let mut remainder = slv.clone();
                let mut data = IndexMap::new();
                for (name, subtype) in fields {
                    let (value, rest) = subtype.reduce_slv(&remainder, generics)?;
                    data.insert(name.clone(), value);
                    remainder = rest;
                }
                Ok((Value::Record(data), remainder))
            }
            Type::Enumeration { literals, .. } => {
                let width = enumeration_width(literals.len()) as usize;
                let (right, rest) = slv.split_right(width)?;
                let index = right
                    .to_uint()
                    .ok_or_else(|| SlvError::InvalidValue("enumeration bit-field is undefined".into()))?
                    as usize;
                let literal = literals
                    .get(index)
                    .ok_or_else(|| SlvError::InvalidValue(format!("enumeration index {index} out of range")))?
                    .clone();
                Ok((Value::Enum(literal), rest))
            }
            Type::UnconstrainedArray { identifier, .. } => Err(SlvError::InvalidValue(format!(
                "unconstrained array `{identifier}` cannot be reduced without a known length"
            ))),
        }
    }
}

fn unconstrained_subtype_width(unconstrained: &Type) -> Result<Expr> {
    match unconstrained {
        Type::UnconstrainedArray { subtype, .. } => subtype.width(),
        other => Err(SlvError::ResolutionError(format!(
            "expected an unconstrained array, found {other:?}"
        ))),
    }
}

fn subtype_reference(subtype: &Type) -> String {
    match subtype {
        Type::ConstrainedStdLogicVector { identifier: None, size, .. } => {
            format!("std_logic_vector({} downto 0)", render_downto(size))
        }
        Type::ConstrainedArray { identifier: None, unconstrained, size } => {
            format!(
                "{}({} downto 0)",
                unconstrained.identifier().unwrap_or("std_logic_vector"),
                render_downto(size)
            )
        }
        other => other.identifier().unwrap_or("std_logic").to_string(),
    }
}

fn render_downto(size: &Expr) -> String {
    format!("{} - 1", symbolic::str_expression(size))
}

fn type_mismatch(expected: &str, got: &Value) -> SlvError {
    SlvError::InvalidValue(format!("expected a value for {expected}, got {got:?}"))
}

fn encode_slv_int(data: Option<i64>, width: usize, signedness: Signedness) -> Result<SlvString> {
    let Some(data) = data else {
        return Ok(SlvString::from_bits(vec![Bit::Undefined; width]));
    };
    match signedness {
        Signedness::Plain | Signedness::Unsigned => {
            let max = (1i64 << width) - 1;
            if data < 0 || data > max {
                return Err(SlvError::InvalidValue(format!(
                    "value {data} out of range [0, {max}] for a {width}-bit unsigned field"
                )));
            }
            SlvString::from_uint(data as u128, width)
        }
        Signedness::Signed => {
            let min = -(1i64 << (width - 1));
            let max = (1i64 << (width - 1)) - 1;
            if data < min || data > max {
                return Err(SlvError::InvalidValue(format!(
                    "value {data} out of range [{min}, {max}] for a {width}-bit signed field"
                )));
            }
            let encoded = if data < 0 { data + (1i64 << width) } else { data };
            SlvString::from_uint(encoded as u128, width)
        }
    }
}

fn decode_slv_int(slv: &SlvString, signedness: Signedness) -> Result<Value> {
    let Some(raw) = slv.to_uint() else {
        return Ok(Value::Int(None));
    };
    let width = slv.len();
    match signedness {
        Signedness::Plain | Signedness::Unsigned => Ok(Value::Int(Some(raw as i64))),
        Signedness::Signed => {
            let max = (1i64 << (width - 1)) - 1;
            let mut data = raw as i64;
            if data > max {
                data -= 1i64 << width;
            }
            Ok(Value::Int(Some(data)))
        }
    }
}

fn encode_array(items: &[Value], subtype: &Type, generics: &Generics) -> Result<SlvString> {
    let mut result = SlvString::new();
    for item in items.iter().rev() {
        result = result.concat(subtype.to_slv(item, generics)?);
    }
    Ok(result)
}

fn decode_array(slv: &SlvString, subtype: &Type, generics: &Generics) -> Result<Value> {
    let element_width = eval(&subtype.width()?, generics)? as usize;
    if element_width == 0 || slv.len() % element_width != 0 {
        return Err(SlvError::InvalidValue(format!(
            "bit-string of length {} is not a multiple of the element width {element_width}",
            slv.len()
        )));
    }
    let count = slv.len() / element_width;
    let bits = slv.bits();
    let mut pieces_decoded = Vec::with_capacity(count);
    for i in 0..count {
        let piece = SlvString::from_bits(bits[i * element_width..(i + 1) * element_width].to_vec());
        pieces_decoded.push(subtype.from_slv(&piece, generics)?);
    }
    pieces_decoded.reverse();
    Ok(Value::Array(pieces_decoded))
}
