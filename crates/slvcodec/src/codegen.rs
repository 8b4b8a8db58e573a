//! Codec generator (component E): walks a resolved package and emits, for
//! each type, VHDL declarations and a template-driven body (spec §4.E).

use std::sync::OnceLock;

use minijinja::Environment;
use serde::Serialize;

use crate::error::{Result, SlvError};
use crate::package::Package;
use crate::symbolic;
use crate::types::Type;

const RECORD_TEMPLATE_NAME: &str = "record";
const ARRAY_TEMPLATE_NAME: &str = "array";
const RECORD_TEMPLATE_SRC: &str = include_str!("../templates/slvcodec_record_template.vhd.jinja");
const ARRAY_TEMPLATE_SRC: &str = include_str!("../templates/slvcodec_array_template.vhd.jinja");

/// The two mandatory `use` clauses plus the package-under-codegen's own
/// `work.<id>` use (spec §4.E). Exposed as a config struct, rather than
/// scattered string literals, so nonstandard library naming only needs to
/// override this in one place.
#[derive(Debug, Clone)]
pub struct CodecGeneratorConfig {
    pub mandatory_uses: Vec<(String, String)>,
}

impl Default for CodecGeneratorConfig {
    fn default() -> Self {
        Self {
            mandatory_uses: vec![
                ("ieee".to_string(), "numeric_std".to_string()),
                ("work".to_string(), "slvcodec".to_string()),
            ],
        }
    }
}

fn templates() -> &'static Environment<'static> {
    static TEMPLATES: OnceLock<Environment<'static>> = OnceLock::new();
    TEMPLATES.get_or_init(|| {
        let mut env = Environment::new();
        env.add_template(RECORD_TEMPLATE_NAME, RECORD_TEMPLATE_SRC)
            .expect("record template is a fixed, valid asset");
        env.add_template(ARRAY_TEMPLATE_NAME, ARRAY_TEMPLATE_SRC)
            .expect("array template is a fixed, valid asset");
        env
    })
}

#[derive(Serialize)]
struct RecordField {
    name: String,
    width: String,
    offset: String,
}

#[derive(Serialize)]
struct RecordContext {
    #[serde(rename = "type")]
    type_name: String,
    fields: Vec<RecordField>,
}

#[derive(Serialize)]
struct ArrayContext {
    #[serde(rename = "type")]
    type_name: String,
    subtype_width: String,
}

fn width_expr_text(typ: &Type) -> Result<String> {
    Ok(symbolic::str_expression(&typ.width()?))
}

fn declaration_block(identifier: &str, typ: &Type) -> Result<String> {
    let width = width_expr_text(typ)?;
    Ok(format!(
        "  constant {identifier}_width: natural := {width};\n  \
         function to_slvcodec (constant data: {identifier}) return std_logic_vector;\n  \
         function from_slvcodec (constant slv: std_logic_vector) return {identifier};"
    ))
}

fn unconstrained_declaration_block(identifier: &str) -> String {
    format!(
        "  function to_slvcodec (constant data: {identifier}) return std_logic_vector;\n  \
         function from_slvcodec (constant slv: std_logic_vector) return {identifier};"
    )
}

fn constrained_declaration_block(identifier: &str, typ: &Type) -> Result<String> {
    let width = width_expr_text(typ)?;
    Ok(format!("  constant {identifier}_width: natural := {width};"))
}

fn record_body(identifier: &str, fields: &[(String, Type)]) -> Result<String> {
    let mut rendered_fields = Vec::with_capacity(fields.len());
    let mut offset = "0".to_string();
    for (name, subtype) in fields {
        let width = width_expr_text(subtype)?;
        rendered_fields.push(RecordField {
            name: name.clone(),
            width: width.clone(),
            offset: offset.clone(),
        });
        offset = if offset == "0" {
            width
        } else {
            format!("{offset}+{width}")
        };
    }
    let rendered = templates()
        .get_template(RECORD_TEMPLATE_NAME)
        .expect("registered at startup")
        .render(RecordContext {
            type_name: identifier.to_string(),
            fields: rendered_fields,
        })
        .map_err(|e| SlvError::UnsupportedType(format!("record template render failed: {e}")))?;
    Ok(rendered)
}

fn array_body(identifier: &str, subtype: &Type) -> Result<String> {
    let subtype_width = width_expr_text(subtype)?;
    let rendered = templates()
        .get_template(ARRAY_TEMPLATE_NAME)
        .expect("registered at startup")
        .render(ArrayContext {
            type_name: identifier.to_string(),
            subtype_width,
        })
        .map_err(|e| SlvError::UnsupportedType(format!("array template render failed: {e}")))?;
    Ok(rendered)
}

/// Emits the declaration and body blocks for one type (spec §4.E). Returns
/// `UnsupportedType` for `StdLogic`/`Enumeration`, matching the reference
/// implementation's `package_generator.make_declarations_and_definitions`,
/// which only covers record/array/constrained-vector variants.
fn declarations_and_definitions(identifier: &str, typ: &Type) -> Result<(String, String)> {
    match typ {
        Type::Record { fields, .. } => {
            let declarations = declaration_block(identifier, typ)?;
            let definitions = record_body(identifier, fields)?;
            Ok((declarations, definitions))
        }
        Type::UnconstrainedArray { subtype, .. } => {
            let declarations = unconstrained_declaration_block(identifier);
            let definitions = array_body(identifier, subtype)?;
            Ok((declarations, definitions))
        }
        Type::ConstrainedArray { .. } | Type::ConstrainedStdLogicVector { .. } => {
            let declarations = constrained_declaration_block(identifier, typ)?;
            Ok((declarations, String::new()))
        }
        Type::StdLogic => Err(SlvError::UnsupportedType("std_logic".to_string())),
        Type::Enumeration { identifier, .. } => Err(SlvError::UnsupportedType(identifier.clone())),
    }
}

/// Emits a `<identifier>_slvcodec` package for every type in `pkg.types`,
/// in iteration order (spec §5 "Ordering guarantee").
pub fn generate_package(pkg: &Package, config: &CodecGeneratorConfig) -> Result<String> {
    log::debug!(
        "generating codec package for `{}` ({} types)",
        pkg.identifier,
        pkg.types.len()
    );

    let mut declarations = Vec::new();
    let mut definitions = Vec::new();
    for (identifier, typ) in &pkg.types {
        let (decl, def) = declarations_and_definitions(identifier, typ)?;
        declarations.push(decl);
        if !def.is_empty() {
            definitions.push(def);
        }
    }

    let mut libraries: Vec<String> = Vec::new();
    let mut use_lines = Vec::new();
    for reference in &pkg.references {
        use_lines.push(format!(
            "use {}.{}.{};",
            reference.library, reference.design_unit, reference.name_within
        ));
        if !libraries.contains(&reference.library) {
            libraries.push(reference.library.clone());
        }
    }
    for (library, design_unit) in &config.mandatory_uses {
        use_lines.push(format!("use {library}.{design_unit}.all;"));
    }
    use_lines.push(format!("use work.{}.all;", pkg.identifier));

    let library_lines: Vec<String> = libraries.iter().map(|l| format!("library {l};")).collect();

    Ok(format!(
        "{library_lines}\n{use_lines}\n\npackage {package_name} is\n\n{declarations}\n\nend package;\n\npackage body {package_name} is\n\n{definitions}\n\nend package body;\n",
        library_lines = library_lines.join("\n"),
        use_lines = use_lines.join("\n"),
        package_name = format!("{}_slvcodec", pkg.identifier),
        declarations = declarations.join("\n"),
        definitions = definitions.join("\n"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{IndexMap, IndexSet};

    #[test]
    fn rejects_enumeration_and_std_logic() {
        let enumeration = Type::Enumeration {
            identifier: "t_color".to_string(),
            literals: vec!["red".to_string(), "green".to_string()],
        };
        assert!(matches!(
            declarations_and_definitions("t_color", &enumeration),
            Err(SlvError::UnsupportedType(_))
        ));
        assert!(matches!(
            declarations_and_definitions("std_logic", &Type::StdLogic),
            Err(SlvError::UnsupportedType(_))
        ));
    }

    #[test]
    fn generates_record_and_width_constant() {
        let mut types = IndexMap::new();
        types.insert(
            "t_pair".to_string(),
            Type::Record {
                identifier: "t_pair".to_string(),
                fields: vec![
                    ("a".to_string(), Type::StdLogic),
                    (
                        "b".to_string(),
                        Type::ConstrainedStdLogicVector {
                            identifier: None,
                            size: crate::symbolic::Expr::Int(4),
                            signedness: crate::types::Signedness::Plain,
                        },
                    ),
                ],
            },
        );
        let pkg = Package {
            identifier: "vhdl_type_pkg".to_string(),
            types,
            constants: IndexMap::new(),
            uses: IndexSet::new(),
            references: Vec::new(),
        };
        let generated = generate_package(&pkg, &CodecGeneratorConfig::default()).unwrap();
        assert!(generated.contains("t_pair_width: natural := 5;"));
        assert!(generated.contains("package vhdl_type_pkg_slvcodec is"));
        assert!(generated.contains("use ieee.numeric_std.all;"));
        assert!(generated.contains("use work.slvcodec.all;"));
    }
}
