//! End-to-end scenarios from the testable-properties list: parse-tree in,
//! resolved model and codec behavior out.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use slvcodec::{
    ParsedConstant, ParsedEntity, ParsedGeneric, ParsedPackage, ParsedPort, ParsedSubtypeIndication, ParsedType,
    ParsedTypeShape, PortDirection, Reference, Signedness, UnresolvedEntity, UnresolvedPackage, Value,
    builtin_packages,
};

fn dummy_package() -> ParsedPackage {
    ParsedPackage {
        identifier: "vhdl_type_pkg".to_string(),
        constants: vec![ParsedConstant {
            identifier: "n".to_string(),
            text: "11".to_string(),
        }],
        types: vec![
            ParsedType {
                identifier: "t_byte".to_string(),
                shape: ParsedTypeShape::ConstrainedVector {
                    signedness: Signedness::Plain,
                    size_text: "3".to_string(),
                },
            },
            ParsedType {
                identifier: "t_byte_array".to_string(),
                shape: ParsedTypeShape::UnconstrainedArray(ParsedSubtypeIndication::Named("t_byte".to_string())),
            },
            ParsedType {
                identifier: "t_data".to_string(),
                shape: ParsedTypeShape::ConstrainedArray {
                    base: ParsedSubtypeIndication::Named("t_byte_array".to_string()),
                    size_text: "8".to_string(),
                },
            },
            ParsedType {
                identifier: "t_dummy".to_string(),
                shape: ParsedTypeShape::Record(vec![(
                    "field".to_string(),
                    ParsedSubtypeIndication::Inline(Box::new(ParsedTypeShape::ConstrainedVector {
                        signedness: Signedness::Plain,
                        size_text: "n".to_string(),
                    })),
                )]),
            },
        ],
        references: vec![
            Reference {
                library: "ieee".to_string(),
                design_unit: "std_logic_1164".to_string(),
                name_within: "all".to_string(),
            },
            Reference {
                library: "ieee".to_string(),
                design_unit: "numeric_std".to_string(),
                name_within: "all".to_string(),
            },
        ],
    }
}

#[test]
fn width_resolution() {
    let unresolved = UnresolvedPackage::from_parsed(&dummy_package()).unwrap();
    let mut packages = builtin_packages();
    let resolved = unresolved.resolve(&packages).unwrap();
    packages.insert(resolved.identifier.clone(), resolved.clone());

    let width = resolved.types["t_dummy"].width().unwrap();
    assert_eq!(slvcodec::symbolic::value(&width).unwrap(), 11);
}

#[test]
fn entity_composition() {
    let parsed_package = dummy_package();
    let unresolved_package = UnresolvedPackage::from_parsed(&parsed_package).unwrap();
    let mut packages = builtin_packages();
    let resolved_package = unresolved_package.resolve(&packages).unwrap();
    packages.insert(resolved_package.identifier.clone(), resolved_package);

    let parsed_entity = ParsedEntity {
        identifier: "dummy".to_string(),
        generics: vec![],
        ports: vec![ParsedPort {
            identifier: "o_data".to_string(),
            mode: PortDirection::Out,
            subtype_indication: ParsedSubtypeIndication::Named("t_data".to_string()),
        }],
        references: vec![Reference {
            library: "work".to_string(),
            design_unit: "vhdl_type_pkg".to_string(),
            name_within: "all".to_string(),
        }],
    };
    let unresolved_entity = UnresolvedEntity::from_parsed(&parsed_entity).unwrap();
    let entity = unresolved_entity.resolve(&packages).unwrap();

    let width = entity.ports["o_data"].typ.width().unwrap();
    assert_eq!(slvcodec::symbolic::value(&width).unwrap(), 24);
}

#[test]
fn signed_round_trip_via_resolved_package() {
    let parsed = ParsedPackage {
        identifier: "sized_pkg".to_string(),
        constants: vec![],
        types: vec![ParsedType {
            identifier: "t_signed8".to_string(),
            shape: ParsedTypeShape::ConstrainedVector {
                signedness: Signedness::Signed,
                size_text: "8".to_string(),
            },
        }],
        references: vec![],
    };
    let unresolved = UnresolvedPackage::from_parsed(&parsed).unwrap();
    let resolved = unresolved.resolve(&builtin_packages()).unwrap();
    let t_signed8 = &resolved.types["t_signed8"];

    let generics = IndexMap::new();
    assert_eq!(
        t_signed8.to_slv(&Value::Int(Some(-1)), &generics).unwrap().to_string(),
        "11111111"
    );
    assert_eq!(
        t_signed8.from_slv(&"10000000".parse().unwrap(), &generics).unwrap(),
        Value::Int(Some(-128))
    );
    assert_eq!(
        t_signed8.from_slv(&"01111111".parse().unwrap(), &generics).unwrap(),
        Value::Int(Some(127))
    );
}

#[test]
fn record_round_trip_via_resolved_package() {
    let parsed = ParsedPackage {
        identifier: "record_pkg".to_string(),
        constants: vec![],
        types: vec![ParsedType {
            identifier: "t_pair".to_string(),
            shape: ParsedTypeShape::Record(vec![
                (
                    "a".to_string(),
                    ParsedSubtypeIndication::Named("std_logic".to_string()),
                ),
                (
                    "b".to_string(),
                    ParsedSubtypeIndication::Inline(Box::new(ParsedTypeShape::ConstrainedVector {
                        signedness: Signedness::Plain,
                        size_text: "4".to_string(),
                    })),
                ),
            ]),
        }],
        references: vec![Reference {
            library: "ieee".to_string(),
            design_unit: "std_logic_1164".to_string(),
            name_within: "all".to_string(),
        }],
    };
    let unresolved = UnresolvedPackage::from_parsed(&parsed).unwrap();
    let resolved = unresolved.resolve(&builtin_packages()).unwrap();
    let t_pair = &resolved.types["t_pair"];

    let mut data = IndexMap::new();
    data.insert("a".to_string(), Value::Bit(Some(true)));
    data.insert("b".to_string(), Value::Int(Some(5)));
    let generics = IndexMap::new();
    let encoded = t_pair.to_slv(&Value::Record(data.clone()), &generics).unwrap();
    assert_eq!(encoded.to_string(), "01011");
    assert_eq!(t_pair.from_slv(&encoded, &generics).unwrap(), Value::Record(data));
}

#[test]
fn enumeration_round_trip_via_resolved_package() {
    let parsed = ParsedPackage {
        identifier: "enum_pkg".to_string(),
        constants: vec![],
        types: vec![ParsedType {
            identifier: "t_color".to_string(),
            shape: ParsedTypeShape::Enumeration(vec![
                "red".to_string(),
                "green".to_string(),
                "blue".to_string(),
                "yellow".to_string(),
            ]),
        }],
        references: vec![],
    };
    let unresolved = UnresolvedPackage::from_parsed(&parsed).unwrap();
    let resolved = unresolved.resolve(&builtin_packages()).unwrap();
    let t_color = &resolved.types["t_color"];

    let generics = IndexMap::new();
    let encoded = t_color.to_slv(&Value::Enum("green".to_string()), &generics).unwrap();
    assert_eq!(encoded.to_string(), "01");
    let decoded = t_color.from_slv(&"11".parse().unwrap(), &generics).unwrap();
    assert_eq!(decoded, Value::Enum("yellow".to_string()));
}

#[test]
fn fix_point_failure_names_both_constants() {
    let parsed = ParsedPackage {
        identifier: "cyclic_pkg".to_string(),
        constants: vec![
            ParsedConstant {
                identifier: "a".to_string(),
                text: "b".to_string(),
            },
            ParsedConstant {
                identifier: "b".to_string(),
                text: "a".to_string(),
            },
        ],
        types: vec![],
        references: vec![],
    };
    let unresolved = UnresolvedPackage::from_parsed(&parsed).unwrap();
    let err = unresolved.resolve(&builtin_packages()).unwrap_err();
    match err {
        slvcodec::SlvError::UnresolvedDependencies(names) => {
            assert_eq!(names, ["a", "b"].into_iter().map(String::from).collect());
        }
        other => panic!("expected UnresolvedDependencies, got {other:?}"),
    }
}

#[test]
fn resolver_is_deterministic_across_runs() {
    let parsed = dummy_package();
    let unresolved = UnresolvedPackage::from_parsed(&parsed).unwrap();
    let packages = builtin_packages();
    let first = unresolved.resolve(&packages).unwrap();
    let second = unresolved.resolve(&packages).unwrap();
    assert_eq!(first, second);
}
