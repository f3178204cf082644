//! TypeScript code generator
//!
//! Renders every declaration into a single `declarations.ts`: one
//! `export interface` per type declaration and one `export enum` per enum
//! declaration. Primitive codes are referenced by name and imported from the
//! primitives module.

use crate::generators::{
    header_text, target_names, GeneratedModule, Generator, GeneratorConfig, OutputTarget,
};
use crate::ir::{
    DeclarationKind, DeclarationSet, EnumDeclaration, PropertyDescriptor, TypeDeclaration,
    TypeExpression,
};
use crate::naming::is_identifier;
use crate::Result;

/// Primitive codes that are TypeScript built-in types and never imported
const BUILTIN_TYPES: &[&str] = &["string", "boolean", "number"];

/// TypeScript code generator
pub struct TypeScriptGenerator {
    config: GeneratorConfig,
}

impl TypeScriptGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn new_default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Generator for TypeScriptGenerator {
    fn generate(&self, declarations: &DeclarationSet) -> Result<GeneratedModule> {
        let mut code = String::new();

        code.push_str(&format!("// {}\n", header_text(declarations)));

        let imports: Vec<&str> = declarations
            .primitive_references()
            .into_iter()
            .filter(|code| !BUILTIN_TYPES.contains(code))
            .collect();
        if !imports.is_empty() {
            code.push_str(&format!(
                "\nimport {{ {} }} from \"{}\";\n",
                imports.join(", "),
                self.config.primitives_module
            ));
        }

        for declaration in declarations.types() {
            code.push('\n');
            code.push_str(&self.generate_interface(declaration));
        }

        for declaration in declarations.enums() {
            code.push('\n');
            code.push_str(&self.generate_enum(declaration));
        }

        Ok(GeneratedModule {
            file_name: OutputTarget::TypeScript.file_name(),
            contents: code,
        })
    }
}

impl TypeScriptGenerator {
    fn generate_interface(&self, declaration: &TypeDeclaration) -> String {
        let mut code = String::new();

        if self.config.generate_docs {
            let mut lines: Vec<String> = Vec::new();
            if let Some(desc) = &declaration.description {
                lines.extend(desc.lines().map(String::from));
            }
            if declaration.kind == DeclarationKind::Backbone {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push(format!("Backbone element for {}", declaration.path));
            }
            code.push_str(&jsdoc(&lines, ""));
        }

        code.push_str(&format!("export interface {} {{\n", declaration.name));
        for property in &declaration.properties {
            code.push_str(&self.generate_property(property));
        }
        code.push_str("}\n");

        code
    }

    fn generate_property(&self, property: &PropertyDescriptor) -> String {
        let mut code = String::new();

        if self.config.generate_docs {
            let mut lines: Vec<String> = Vec::new();
            if let Some(desc) = &property.description {
                lines.extend(desc.lines().map(String::from));
            }
            if !property.target_profiles.is_empty() {
                lines.push(format!(
                    "References: {}",
                    target_names(&property.target_profiles).join(" | ")
                ));
            }
            code.push_str(&jsdoc(&lines, "  "));
        }

        let optional_marker = if property.required { "" } else { "?" };
        code.push_str(&format!(
            "  {}{}: {};\n",
            property_key(&property.name),
            optional_marker,
            render_type(&property.type_expression, property.is_array)
        ));

        code
    }

    fn generate_enum(&self, declaration: &EnumDeclaration) -> String {
        let mut code = String::new();

        if self.config.generate_docs {
            let mut lines: Vec<String> = declaration
                .docs
                .iter()
                .flat_map(|doc| doc.lines().map(String::from))
                .collect();
            if let Some(value_set) = &declaration.value_set {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push(format!("Value set: {}", value_set));
            }
            code.push_str(&jsdoc(&lines, ""));
        }

        code.push_str(&format!("export enum {} {{\n", declaration.name));
        for member in &declaration.members {
            code.push_str(&format!(
                "  {} = {},\n",
                property_key(&member.name),
                string_literal(&member.literal)
            ));
        }
        code.push_str("}\n");

        code
    }
}

/// Render a type expression, applying array notation
pub fn render_type(expression: &TypeExpression, is_array: bool) -> String {
    let base = match expression {
        TypeExpression::Any => "any".to_string(),
        TypeExpression::Single(type_ref) => type_ref.name().to_string(),
        TypeExpression::Union(refs) => refs
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(" | "),
    };

    match (expression, is_array) {
        (TypeExpression::Union(_), true) => format!("({})[]", base),
        (_, true) => format!("{}[]", base),
        (_, false) => base,
    }
}

/// Property or enum member key, quoted when not a bare identifier
fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

fn string_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn jsdoc(lines: &[String], indent: &str) -> String {
    if lines.is_empty() {
        return String::new();
    }

    let mut doc = format!("{}/**\n", indent);
    for line in lines {
        let line = line.trim_end().replace("*/", "*\\/");
        if line.is_empty() {
            doc.push_str(&format!("{} *\n", indent));
        } else {
            doc.push_str(&format!("{} * {}\n", indent, line));
        }
    }
    doc.push_str(&format!("{} */\n", indent));
    doc
}
