//! Package and entity model (component C): named collections of constants
//! and types, and the entities that use them (spec §4.C).

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, SlvError};
use crate::parsetree::{
    ParsedEntity, ParsedGeneric, ParsedPackage, ParsedPort, ParsedSubtypeIndication, ParsedTypeShape, PortDirection,
    Reference,
};
use crate::resolve::resolve_dependencies;
use crate::symbolic::{self, Expr};
use crate::types::{Type, UnresolvedSubtype, UnresolvedType};

/// A generic parameter. Behaves as a free name at resolution time; its
/// numeric value is supplied only at encode/decode time (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generic {
    pub name: String,
    pub type_name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    Inout,
    Buffer,
}

impl From<PortDirection> for Direction {
    fn from(d: PortDirection) -> Self {
        match d {
            PortDirection::In => Direction::In,
            PortDirection::Out => Direction::Out,
            PortDirection::Inout => Direction::Inout,
            PortDirection::Buffer => Direction::Buffer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub typ: Type,
}

/// Checks `references` against spec §6's external-interface rules
/// (`name_within` must be `"all"`, design units must be unique) and returns
/// the set of used package names in declaration order.
fn validate_references(references: &[Reference]) -> Result<IndexSet<String>> {
    let mut uses = IndexSet::new();
    for reference in references {
        if reference.name_within != "all" {
            return Err(SlvError::UnsupportedUse(reference.name_within.clone()));
        }
        if !uses.insert(reference.design_unit.clone()) {
            return Err(SlvError::DuplicateUse(reference.design_unit.clone()));
        }
    }
    Ok(uses)
}

fn convert_subtype(s: &ParsedSubtypeIndication) -> Result<UnresolvedSubtype> {
    match s {
        ParsedSubtypeIndication::Named(name) => Ok(UnresolvedSubtype::Named(name.clone())),
        ParsedSubtypeIndication::Inline(shape) => {
            Ok(UnresolvedSubtype::Inline(Box::new(convert_type_shape(shape)?)))
        }
    }
}

fn convert_type_shape(shape: &ParsedTypeShape) -> Result<UnresolvedType> {
    match shape {
        ParsedTypeShape::Record(fields) => {
            let fields = fields
                .iter()
                .map(|(name, subtype)| Ok((name.clone(), convert_subtype(subtype)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(UnresolvedType::Record { fields })
        }
        ParsedTypeShape::UnconstrainedArray(subtype) => Ok(UnresolvedType::UnconstrainedArray {
            subtype: convert_subtype(subtype)?,
        }),
        ParsedTypeShape::ConstrainedArray { base, size_text } => Ok(UnresolvedType::ConstrainedArray {
            base: convert_subtype(base)?,
            size: symbolic::parse_and_simplify(size_text)?,
        }),
        ParsedTypeShape::ConstrainedVector { signedness, size_text } => {
            Ok(UnresolvedType::ConstrainedStdLogicVector {
                size: symbolic::parse_and_simplify(size_text)?,
                signedness: *signedness,
            })
        }
        ParsedTypeShape::Enumeration(literals) => Ok(UnresolvedType::Enumeration {
            literals: literals.clone(),
        }),
    }
}

/// A package whose `uses` have not yet been attached and whose constants
/// and types may still reference bare names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedPackage {
    pub identifier: String,
    pub types: IndexMap<String, UnresolvedType>,
    pub constants: IndexMap<String, Expr>,
    pub uses: IndexSet<String>,
    pub references: Vec<Reference>,
}

impl UnresolvedPackage {
    /// Parses a [`ParsedPackage`] into an `UnresolvedPackage`: lexes and
    /// parses every constant's right-hand-side text and every type's size
    /// expressions, and validates `references` (spec §6).
    pub fn from_parsed(parsed: &ParsedPackage) -> Result<Self> {
        let uses = validate_references(&parsed.references)?;
        let mut constants = IndexMap::new();
        for c in &parsed.constants {
            constants.insert(c.identifier.clone(), symbolic::parse_and_simplify(&c.text)?);
        }
        let mut types = IndexMap::new();
        for t in &parsed.types {
            types.insert(t.identifier.clone(), convert_type_shape(&t.shape)?);
        }
        Ok(UnresolvedPackage {
            identifier: parsed.identifier.clone(),
            types,
            constants,
            uses,
            references: parsed.references.clone(),
        })
    }

    /// Resolves this package against a set of already-resolved packages
    /// (spec §4.C): merges `use`d environments, then drains constants and
    /// types through the dependency fix-point.
    pub fn resolve(&self, packages: &IndexMap<String, Package>) -> Result<Package> {
        let (available_types, available_constants) = merge_used_packages(&self.uses, packages)?;

        let resolved_constants = resolve_dependencies(
            &available_constants,
            &self.constants,
            |_, expr| symbolic::get_constant_list(expr),
            |_, expr, env| symbolic::simplify(symbolic::substitute(expr, env)),
        )?;

        let mut constants_for_types = available_constants;
        for (name, value) in &resolved_constants {
            constants_for_types.insert(name.clone(), value.clone());
        }

        let type_dependencies: IndexMap<String, BTreeSet<String>> = self
            .types
            .iter()
            .map(|(name, t)| {
                let mut deps = BTreeSet::new();
                t.type_dependencies(&mut deps);
                (name.clone(), deps)
            })
            .collect();

        let resolved_types = resolve_dependencies(
            &available_types,
            &self.types,
            |name, _| type_dependencies[name].clone(),
            |name, t, env| t.resolve(Some(name), env, &constants_for_types),
        )?;

        log::debug!(
            "resolved package `{}`: {} constants, {} types",
            self.identifier,
            resolved_constants.len(),
            resolved_types.len()
        );

        Ok(Package {
            identifier: self.identifier.clone(),
            types: resolved_types,
            constants: resolved_constants,
            uses: self.uses.clone(),
            references: self.references.clone(),
        })
    }
}

/// A package with every constant evaluated and every type resolved.
/// `types`/`constants` hold only this package's own declarations — not the
/// ones it imports via `uses`, which a consumer re-resolves by name through
/// the `uses` set and the enclosing package table.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub identifier: String,
    pub types: IndexMap<String, Type>,
    pub constants: IndexMap<String, Expr>,
    pub uses: IndexSet<String>,
    pub references: Vec<Reference>,
}

fn merge_used_packages(
    uses: &IndexSet<String>,
    packages: &IndexMap<String, Package>,
) -> Result<(IndexMap<String, Type>, IndexMap<String, Expr>)> {
    let mut types = IndexMap::new();
    let mut constants = IndexMap::new();
    for name in uses {
        let used = packages
            .get(name)
            .ok_or_else(|| SlvError::ResolutionError(name.clone()))?;
        for (type_name, t) in &used.types {
            if types.insert(type_name.clone(), t.clone()).is_some() {
                return Err(SlvError::NameCollision(type_name.clone()));
            }
        }
        for (const_name, c) in &used.constants {
            if constants.insert(const_name.clone(), c.clone()).is_some() {
                return Err(SlvError::NameCollision(const_name.clone()));
            }
        }
    }
    Ok((types, constants))
}

/// The `std_logic_1164` built-in package: `std_logic` and the
/// length-indefinite `std_logic_vector` array template (spec §4.C).
pub fn std_logic_1164() -> Package {
    let mut types = IndexMap::new();
    types.insert("std_logic".to_string(), Type::StdLogic);
    types.insert(
        "std_logic_vector".to_string(),
        Type::UnconstrainedArray {
            identifier: "std_logic_vector".to_string(),
            subtype: Box::new(Type::StdLogic),
        },
    );
    Package {
        identifier: "std_logic_1164".to_string(),
        types,
        constants: IndexMap::new(),
        uses: IndexSet::new(),
        references: Vec::new(),
    }
}

/// The `numeric_std` built-in package: `unsigned`/`signed` array templates
/// (spec §4.C).
pub fn numeric_std() -> Package {
    let mut types = IndexMap::new();
    types.insert(
        "unsigned".to_string(),
        Type::UnconstrainedArray {
            identifier: "unsigned".to_string(),
            subtype: Box::new(Type::StdLogic),
        },
    );
    types.insert(
        "signed".to_string(),
        Type::UnconstrainedArray {
            identifier: "signed".to_string(),
            subtype: Box::new(Type::StdLogic),
        },
    );
    Package {
        identifier: "numeric_std".to_string(),
        types,
        constants: IndexMap::new(),
        uses: IndexSet::new(),
        references: Vec::new(),
    }
}

/// Seeds a package table with the two built-in packages, matching spec
/// §4.C's "two built-in packages are pre-populated".
pub fn builtin_packages() -> IndexMap<String, Package> {
    let mut packages = IndexMap::new();
    packages.insert("std_logic_1164".to_string(), std_logic_1164());
    packages.insert("numeric_std".to_string(), numeric_std());
    packages
}

/// An entity whose generics/ports may still reference bare type/constant
/// names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedEntity {
    pub identifier: String,
    pub generics: IndexMap<String, (UnresolvedSubtype, Option<Expr>)>,
    pub ports: IndexMap<String, (Direction, UnresolvedSubtype)>,
    pub uses: IndexSet<String>,
    pub references: Vec<Reference>,
}

impl UnresolvedEntity {
    pub fn from_parsed(parsed: &ParsedEntity) -> Result<Self> {
        let uses = validate_references(&parsed.references)?;
        let mut generics = IndexMap::new();
        for g in &parsed.generics {
            generics.insert(
                g.identifier.clone(),
                (convert_generic_subtype(g)?, parse_default(g)?),
            );
        }
        let mut ports = IndexMap::new();
        for p in &parsed.ports {
            ports.insert(
                p.identifier.clone(),
                (Direction::from(p.mode), convert_subtype(&p.subtype_indication)?),
            );
        }
        Ok(UnresolvedEntity {
            identifier: parsed.identifier.clone(),
            generics,
            ports,
            uses,
            references: parsed.references.clone(),
        })
    }

    /// Resolves ports against a package table (spec §4.C): merges `use`d
    /// types/constants, folds in the entity's own generics as symbolic
    /// names, then resolves each port's type. Generics themselves are never
    /// evaluated here.
    pub fn resolve(&self, packages: &IndexMap<String, Package>) -> Result<Entity> {
        let (available_types, mut available_constants) = merge_used_packages(&self.uses, packages)?;

        let mut generics = IndexMap::new();
        for (name, (type_name, default)) in &self.generics {
            // A generic is a free name until encode/decode time; mapping it
            // to itself lets size expressions reference it without
            // resolution failing, while leaving it symbolic.
            available_constants.insert(name.clone(), Expr::Name(name.clone()));
            generics.insert(
                name.clone(),
                Generic {
                    name: name.clone(),
                    type_name: describe_subtype(type_name),
                    default: default.clone(),
                },
            );
        }

        let mut ports = IndexMap::new();
        for (name, (direction, subtype)) in &self.ports {
            let typ = subtype.resolve(&available_types, &available_constants)?;
            ports.insert(
                name.clone(),
                Port {
                    name: name.clone(),
                    direction: *direction,
                    typ,
                },
            );
        }

        log::debug!(
            "resolved entity `{}`: {} generics, {} ports",
            self.identifier,
            generics.len(),
            ports.len()
        );

        Ok(Entity {
            identifier: self.identifier.clone(),
            generics,
            ports,
            uses: self.uses.clone(),
            references: self.references.clone(),
        })
    }
}

fn describe_subtype(s: &UnresolvedSubtype) -> String {
    match s {
        UnresolvedSubtype::Named(name) => name.clone(),
        UnresolvedSubtype::Inline(_) => "<inline>".to_string(),
    }
}

fn convert_generic_subtype(g: &ParsedGeneric) -> Result<UnresolvedSubtype> {
    convert_subtype(&g.subtype_indication)
}

fn parse_default(g: &ParsedGeneric) -> Result<Option<Expr>> {
    g.default_text
        .as_deref()
        .map(symbolic::parse_and_simplify)
        .transpose()
}

/// A fully resolved entity: every port's type is direct, but generics
/// remain symbolic names supplied at encode/decode time.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub identifier: String,
    pub generics: IndexMap<String, Generic>,
    pub ports: IndexMap<String, Port>,
    pub uses: IndexSet<String>,
    pub references: Vec<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsetree::{ParsedConstant, ParsedType};

    fn dummy_package() -> ParsedPackage {
        ParsedPackage {
            identifier: "vhdl_type_pkg".to_string(),
            constants: vec![ParsedConstant {
                identifier: "n".to_string(),
                text: "11".to_string(),
            }],
            types: vec![ParsedType {
                identifier: "t_dummy".to_string(),
                shape: ParsedTypeShape::Record(vec![(
                    "field".to_string(),
                    ParsedSubtypeIndication::Inline(Box::new(ParsedTypeShape::ConstrainedVector {
                        signedness: crate::types::Signedness::Plain,
                        size_text: "n".to_string(),
                    })),
                )]),
            }],
            references: vec![],
        }
    }

    #[test]
    fn width_resolution_scenario() {
        let unresolved = UnresolvedPackage::from_parsed(&dummy_package()).unwrap();
        let resolved = unresolved.resolve(&builtin_packages()).unwrap();
        let t_dummy = &resolved.types["t_dummy"];
        let width = t_dummy.width().unwrap();
        assert_eq!(symbolic::value(&width).unwrap(), 11);
    }

    #[test]
    fn name_collision_on_conflicting_uses() {
        let a = Package {
            identifier: "a".to_string(),
            types: {
                let mut m = IndexMap::new();
                m.insert("shared".to_string(), Type::StdLogic);
                m
            },
            constants: IndexMap::new(),
            uses: IndexSet::new(),
            references: vec![],
        };
        let b = Package {
            identifier: "b".to_string(),
            types: {
                let mut m = IndexMap::new();
                m.insert("shared".to_string(), Type::StdLogic);
                m
            },
            constants: IndexMap::new(),
            uses: IndexSet::new(),
            references: vec![],
        };
        let mut packages = IndexMap::new();
        packages.insert("a".to_string(), a);
        packages.insert("b".to_string(), b);
        let mut uses = IndexSet::new();
        uses.insert("a".to_string());
        uses.insert("b".to_string());
        let err = merge_used_packages(&uses, &packages).unwrap_err();
        assert!(matches!(err, SlvError::NameCollision(_)));
    }

    #[test]
    fn unsupported_use_rejects_non_all_selection() {
        let refs = vec![Reference {
            library: "work".to_string(),
            design_unit: "other_pkg".to_string(),
            name_within: "thing".to_string(),
        }];
        assert!(matches!(
            validate_references(&refs),
            Err(SlvError::UnsupportedUse(_))
        ));
    }

    #[test]
    fn duplicate_use_is_rejected() {
        let refs = vec![
            Reference {
                library: "work".to_string(),
                design_unit: "other_pkg".to_string(),
                name_within: "all".to_string(),
            },
            Reference {
                library: "work".to_string(),
                design_unit: "other_pkg".to_string(),
                name_within: "all".to_string(),
            },
        ];
        assert!(matches!(validate_references(&refs), Err(SlvError::DuplicateUse(_))));
    }
}
