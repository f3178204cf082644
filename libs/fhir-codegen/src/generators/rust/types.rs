//! Type generation for Rust structs and enums

use crate::generators::{target_names, GeneratorConfig};
use crate::ir::{
    DeclarationKind, DeclarationSet, EnumDeclaration, PropertyDescriptor, TypeDeclaration,
    TypeExpression, TypeRef,
};
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::{HashMap, HashSet};

/// `(type, property)` pairs whose field needs a `Box`
pub type BoxedFields = HashSet<(String, String)>;

/// Singular fields that lie on a reference cycle between declared types.
///
/// A struct holding itself, directly or through other structs, by value has
/// infinite size; every singular field on such a cycle is boxed. Array fields
/// already live behind a `Vec` and never need it.
pub fn recursive_fields(declarations: &DeclarationSet) -> BoxedFields {
    let edges: HashMap<&str, Vec<(&str, &str)>> = declarations
        .types()
        .iter()
        .map(|type_def| {
            let targets = type_def
                .properties
                .iter()
                .filter(|p| !p.is_array)
                .filter_map(|p| match &p.type_expression {
                    TypeExpression::Single(TypeRef::Named(name))
                        if declarations.get_type(name).is_some() =>
                    {
                        Some((p.name.as_str(), name.as_str()))
                    }
                    _ => None,
                })
                .collect();
            (type_def.name.as_str(), targets)
        })
        .collect();

    let mut boxed = BoxedFields::new();
    for (owner, targets) in &edges {
        for (field, target) in targets {
            if reaches(&edges, target, owner) {
                boxed.insert((owner.to_string(), field.to_string()));
            }
        }
    }
    boxed
}

/// Whether `to` is reachable from `from` along singular fields
fn reaches(edges: &HashMap<&str, Vec<(&str, &str)>>, from: &str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(targets) = edges.get(current) {
            stack.extend(targets.iter().map(|(_, target)| *target));
        }
    }

    false
}

/// Generate a Rust struct for a type declaration
pub fn generate_struct(
    type_def: &TypeDeclaration,
    declarations: &DeclarationSet,
    boxed: &BoxedFields,
    config: &GeneratorConfig,
) -> String {
    let mut code = String::new();

    // Generate documentation
    if config.generate_docs {
        let mut has_docs = false;
        if let Some(desc) = &type_def.description {
            for line in desc.lines() {
                code.push_str(&doc_line("", line));
            }
            has_docs = true;
        }

        if type_def.kind == DeclarationKind::Backbone {
            if has_docs {
                code.push_str("///\n");
            }
            code.push_str(&format!("/// Backbone element for {}\n", type_def.path));
        }
    }

    // Generate derive macros
    code.push_str("#[derive(Debug, Clone, PartialEq");
    if config.generate_serde {
        code.push_str(", Serialize, Deserialize");
    }
    code.push_str(")]\n");

    // Struct definition
    code.push_str(&format!("pub struct {} {{\n", type_def.name));

    // Generate fields
    for property in &type_def.properties {
        code.push_str(&generate_field(
            property,
            type_def,
            declarations,
            boxed,
            config,
        ));
    }

    code.push('}');

    code
}

/// Generate a field for a property
fn generate_field(
    property: &PropertyDescriptor,
    owner: &TypeDeclaration,
    declarations: &DeclarationSet,
    boxed: &BoxedFields,
    config: &GeneratorConfig,
) -> String {
    let mut code = String::new();

    // Documentation
    if config.generate_docs {
        if let Some(desc) = &property.description {
            for line in desc.lines() {
                code.push_str(&doc_line("    ", line));
            }
        }

        if !property.target_profiles.is_empty() {
            code.push_str(&format!(
                "    /// References: {}\n",
                target_names(&property.target_profiles).join(" | ")
            ));
        }
    }

    // Field name (convert to snake_case and handle keywords)
    let field_name = sanitize_field_name(&property.name);

    // Serde attributes
    if config.generate_serde {
        if !property.required {
            code.push_str("    #[serde(skip_serializing_if = \"Option::is_none\")]\n");
        }

        if property.name.to_snake_case() != property.name || is_rust_keyword(&property.name) {
            code.push_str(&format!("    #[serde(rename = {:?})]\n", property.name));
        }
    }

    // Field type
    let field_type = generate_field_type(property, owner, declarations, boxed);

    code.push_str(&format!("    pub {}: {},\n", field_name, field_type));

    code
}

/// Generate the Rust type for a property
fn generate_field_type(
    property: &PropertyDescriptor,
    owner: &TypeDeclaration,
    declarations: &DeclarationSet,
    boxed: &BoxedFields,
) -> String {
    let base_type = match &property.type_expression {
        TypeExpression::Single(TypeRef::Primitive(code)) => map_primitive_to_rust(code).to_string(),
        TypeExpression::Single(TypeRef::Named(name)) => {
            if declarations.get_type(name).is_none() {
                // Not generated in this module, use Value as fallback
                "serde_json::Value".to_string()
            } else if boxed.contains(&(owner.name.clone(), property.name.clone())) {
                format!("Box<{}>", name)
            } else {
                name.clone()
            }
        }
        // Multiple types - could generate an enum, but for now use Value
        TypeExpression::Union(_) | TypeExpression::Any => "serde_json::Value".to_string(),
    };

    // Wrap in Vec if array
    let base_type = if property.is_array {
        format!("Vec<{}>", base_type)
    } else {
        base_type
    };

    // Wrap in Option if optional
    if property.required {
        base_type
    } else {
        format!("Option<{}>", base_type)
    }
}

/// Map a FHIR primitive to a Rust type
fn map_primitive_to_rust(code: &str) -> &'static str {
    match code {
        "boolean" => "bool",
        "integer" | "unsignedInt" | "positiveInt" => "i32",
        "integer64" => "i64",
        "decimal" => "f64",
        _ => "String",
    }
}

/// Generate a Rust enum for an enum declaration
pub fn generate_enum(enum_def: &EnumDeclaration, config: &GeneratorConfig) -> String {
    let mut code = String::new();

    if config.generate_docs {
        for doc in &enum_def.docs {
            for line in doc.lines() {
                code.push_str(&doc_line("", line));
            }
        }
        if let Some(value_set) = &enum_def.value_set {
            if !enum_def.docs.is_empty() {
                code.push_str("///\n");
            }
            code.push_str(&format!("/// Value set: {}\n", value_set));
        }
    }

    code.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash");
    if config.generate_serde {
        code.push_str(", Serialize, Deserialize");
    }
    code.push_str(")]\n");

    code.push_str(&format!("pub enum {} {{\n", enum_def.name));

    let mut used = HashSet::new();
    for (index, member) in enum_def.members.iter().enumerate() {
        if config.generate_serde {
            code.push_str(&format!("    #[serde(rename = {:?})]\n", member.literal));
        }
        code.push_str(&format!(
            "    {},\n",
            variant_name(&member.name, index, &mut used)
        ));
    }

    code.push('}');

    code
}

fn doc_line(indent: &str, line: &str) -> String {
    let line = line.trim_end();
    if line.is_empty() {
        format!("{}///\n", indent)
    } else {
        format!("{}/// {}\n", indent, line)
    }
}

/// UpperCamelCase variant name, unique within the enum
fn variant_name(member: &str, index: usize, used: &mut HashSet<String>) -> String {
    let mut name: String = member
        .to_upper_camel_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if name.is_empty() {
        name = format!("Variant{}", index);
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'V');
    }
    if is_rust_keyword(&name) {
        name.push('_');
    }
    while !used.insert(name.clone()) {
        name.push_str(&index.to_string());
    }

    name
}

/// Sanitize a field name to be a valid Rust identifier
fn sanitize_field_name(name: &str) -> String {
    let snake = name.to_snake_case();

    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", snake)
    } else if matches!(snake.as_str(), "self" | "super" | "crate") {
        // Not usable as raw identifiers
        format!("{}_", snake)
    } else if is_rust_keyword(&snake) {
        format!("r#{}", snake)
    } else {
        snake
    }
}

/// Check if a string is a Rust keyword
fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "break"
            | "const"
            | "continue"
            | "crate"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
    )
}
