//! Rust code generator for FHIR declarations

mod types;

use crate::generators::{header_text, GeneratedModule, Generator, GeneratorConfig, OutputTarget};
use crate::ir::DeclarationSet;
use crate::Result;

/// Rust code generator
pub struct RustGenerator {
    config: GeneratorConfig,
}

impl RustGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn new_default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Generator for RustGenerator {
    fn generate(&self, declarations: &DeclarationSet) -> Result<GeneratedModule> {
        let mut code = String::new();

        // Header comment
        code.push_str(&format!("//! {}\n", header_text(declarations)));

        // Imports
        if self.config.generate_serde && !declarations.is_empty() {
            code.push_str("\nuse serde::{Deserialize, Serialize};\n");
        }

        let boxed = types::recursive_fields(declarations);
        for type_def in declarations.types() {
            code.push('\n');
            code.push_str(&types::generate_struct(
                type_def,
                declarations,
                &boxed,
                &self.config,
            ));
            code.push('\n');
        }

        for enum_def in declarations.enums() {
            code.push('\n');
            code.push_str(&types::generate_enum(enum_def, &self.config));
            code.push('\n');
        }

        Ok(GeneratedModule {
            file_name: OutputTarget::Rust.file_name(),
            contents: code,
        })
    }
}
