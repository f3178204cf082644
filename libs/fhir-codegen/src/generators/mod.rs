//! Code generators for different target languages
//!
//! Each language has its own module that implements the `Generator` trait.
//! A generator renders a whole `DeclarationSet` into exactly one module.

pub mod rust;
pub mod typescript;

use crate::ir::DeclarationSet;
use crate::Result;
use std::fmt;
use std::str::FromStr;

/// Trait that all language generators must implement
pub trait Generator {
    /// Render the declaration set as a single module
    fn generate(&self, declarations: &DeclarationSet) -> Result<GeneratedModule>;
}

/// One rendered output module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    /// File name relative to the output directory
    pub file_name: String,
    pub contents: String,
}

/// Language of the generated module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// `declarations.ts` with interfaces and enums
    #[default]
    TypeScript,
    /// `declarations.rs` with serde structs and enums
    Rust,
}

impl OutputTarget {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputTarget::TypeScript => "ts",
            OutputTarget::Rust => "rs",
        }
    }

    /// `declarations.<ext>`
    pub fn file_name(&self) -> String {
        format!("declarations.{}", self.extension())
    }

    /// Generator for this target
    pub fn generator(&self, config: GeneratorConfig) -> Box<dyn Generator> {
        match self {
            OutputTarget::TypeScript => Box::new(typescript::TypeScriptGenerator::new(config)),
            OutputTarget::Rust => Box::new(rust::RustGenerator::new(config)),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::TypeScript => f.write_str("typescript"),
            OutputTarget::Rust => f.write_str("rust"),
        }
    }
}

impl FromStr for OutputTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(OutputTarget::TypeScript),
            "rust" | "rs" => Ok(OutputTarget::Rust),
            other => Err(format!(
                "unknown target {other} (expected typescript or rust)"
            )),
        }
    }
}

/// Configuration options for code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Whether to generate documentation comments
    pub generate_docs: bool,
    /// Whether to generate serde derive macros (Rust target)
    pub generate_serde: bool,
    /// Module the primitive type symbols are imported from (TypeScript target)
    pub primitives_module: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generate_docs: true,
            generate_serde: true,
            primitives_module: "./primitives".to_string(),
        }
    }
}

/// First line of every generated module, without comment markers
pub(crate) fn header_text(declarations: &DeclarationSet) -> String {
    format!(
        "Generated from FHIR {} StructureDefinitions. Do not edit manually.",
        declarations.fhir_version
    )
}

/// Resource type names from target profile URLs, for documentation
pub(crate) fn target_names(profiles: &[String]) -> Vec<&str> {
    profiles
        .iter()
        .map(|url| url.rsplit('/').next().unwrap_or(url))
        .collect()
}
